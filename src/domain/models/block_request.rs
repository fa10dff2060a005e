//! Domain model for a card block request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account_holder::HolderId;
use super::card::CardId;

pub type RequestId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    /// Reachable terminal state reserved for self-service cancellation;
    /// no operation in this crate produces it yet.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRequest {
    pub id: RequestId,
    pub card_id: CardId,
    pub requested_by: HolderId,
    pub reason: String,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<HolderId>,
    pub admin_comment: Option<String>,
}

impl BlockRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
