//! Domain model for a ledger entry (a balance-moving transaction record).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::card::{Card, CardId};

pub type EntryId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    Transfer,
    Deposit,
    Withdrawal,
    Payment,
    Refund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Reversed,
}

impl EntryStatus {
    /// Terminal entries are immutable.
    pub fn is_terminal(self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

/// Denormalized view of a card captured at entry creation. Card deletion is
/// an administrative act that does not cascade into history; these
/// snapshots keep old entries readable after the card row is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub card_id: CardId,
    pub masked_number: String,
    pub holder_name: String,
}

impl CardSnapshot {
    pub fn of(card: &Card) -> Self {
        CardSnapshot {
            card_id: card.id,
            masked_number: card.masked_number.clone(),
            holder_name: card.holder_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    /// Globally unique, e.g. `TXN-20260826143015-1A2B3C4D`.
    pub transaction_id: String,
    /// Globally unique, e.g. `REF-0F1E2D3C4B`.
    pub reference_number: String,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub amount: Decimal,
    /// Absent for pure deposits.
    pub source: Option<CardSnapshot>,
    /// Absent for pure withdrawals.
    pub destination: Option<CardSnapshot>,
    pub description: String,
    /// Source-card balance snapshots around processing.
    pub balance_before: Option<Decimal>,
    pub balance_after: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
}

impl LedgerEntry {
    pub fn source_card_id(&self) -> Option<CardId> {
        self.source.as_ref().map(|s| s.card_id)
    }

    pub fn destination_card_id(&self) -> Option<CardId> {
        self.destination.as_ref().map(|s| s.card_id)
    }

    pub fn involves_card(&self, card_id: CardId) -> bool {
        self.source_card_id() == Some(card_id) || self.destination_card_id() == Some(card_id)
    }

    pub fn involves_any(&self, card_ids: &[CardId]) -> bool {
        card_ids.iter().any(|id| self.involves_card(*id))
    }
}
