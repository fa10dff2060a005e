//! Domain-level command and query types.
//!
//! These structs are the inputs and outputs of the domain services. The
//! transport layer is responsible for mapping its request/response framing
//! onto these internal types.

pub mod cards {
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};

    use crate::domain::models::{Card, CardId, CardStatus, CardType};

    /// Input for issuing a new card.
    #[derive(Debug, Clone)]
    pub struct CreateCardCommand {
        pub card_type: CardType,
        /// Defaults to the owner's full name.
        pub holder_name: Option<String>,
        /// Defaults to the policy's daily limit.
        pub daily_limit: Option<Decimal>,
        /// Defaults to zero.
        pub initial_balance: Option<Decimal>,
    }

    /// Administrative card update. Partial by design: absent fields are
    /// left untouched.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateCardCommand {
        pub status: Option<CardStatus>,
        pub daily_limit: Option<Decimal>,
    }

    /// Query parameters for card listings.
    #[derive(Debug, Clone, Default)]
    pub struct CardListQuery {
        pub after: Option<CardId>,
        pub limit: Option<u32>,
        /// Restrict to cards whose effective status is Active.
        pub active_only: bool,
        /// Case-insensitive match over masked number and holder name.
        pub search: Option<String>,
    }

    /// Generic pagination info returned by list queries.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PaginationInfo {
        pub has_more: bool,
        pub next_cursor: Option<String>,
    }

    /// Card projection safe to show to the card's owner or an admin. No
    /// encrypted material; status is the effective status.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CardView {
        pub id: CardId,
        pub masked_number: String,
        pub holder_name: String,
        pub card_type: CardType,
        pub status: CardStatus,
        pub balance: Decimal,
        pub daily_limit: Option<Decimal>,
        pub expiry_date: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl CardView {
        pub fn of(card: &Card, today: NaiveDate) -> Self {
            CardView {
                id: card.id,
                masked_number: card.masked_number.clone(),
                holder_name: card.holder_name.clone(),
                card_type: card.card_type,
                status: card.effective_status(today),
                balance: card.balance,
                daily_limit: card.daily_limit,
                expiry_date: card.expiry_date,
                created_at: card.created_at,
                updated_at: card.updated_at,
            }
        }
    }

    /// Detail view: adds spend-tracking and block metadata plus owner
    /// contact fields.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CardDetails {
        pub card: CardView,
        /// Sum of today's completed outgoing transfers.
        pub today_spent: Decimal,
        pub owner_name: String,
        pub owner_email: String,
        pub block_reason: Option<String>,
        pub blocked_at: Option<DateTime<Utc>>,
    }

    /// Result of listing cards.
    #[derive(Debug, Clone)]
    pub struct CardListResult {
        pub cards: Vec<CardView>,
        pub pagination: PaginationInfo,
    }
}

pub mod transfers {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    use crate::domain::models::{CardId, EntryId, EntryStatus, LedgerEntry};

    use super::cards::PaginationInfo;

    /// Input for a transfer between two cards owned by the caller.
    #[derive(Debug, Clone)]
    pub struct TransferCommand {
        pub source_card_id: CardId,
        pub destination_card_id: CardId,
        pub amount: Decimal,
        pub description: Option<String>,
    }

    /// Query parameters for ledger entry listings.
    #[derive(Debug, Clone, Default)]
    pub struct EntryListQuery {
        pub after: Option<EntryId>,
        pub limit: Option<u32>,
        pub status: Option<EntryStatus>,
    }

    /// Closed-open date range, `[start, end)`.
    #[derive(Debug, Clone)]
    pub struct DateRangeQuery {
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
    }

    /// Result of listing ledger entries.
    #[derive(Debug, Clone)]
    pub struct EntryListResult {
        pub entries: Vec<LedgerEntry>,
        pub pagination: PaginationInfo,
    }
}

pub mod block_requests {
    use crate::domain::models::{CardId, RequestId, RequestStatus};

    /// Input for an account holder requesting that their card be blocked.
    #[derive(Debug, Clone)]
    pub struct RequestBlockCommand {
        pub card_id: CardId,
        pub reason: String,
    }

    /// Administrative decision on a pending block request.
    #[derive(Debug, Clone)]
    pub struct ProcessBlockRequestCommand {
        pub request_id: RequestId,
        pub approve: bool,
        pub admin_comment: Option<String>,
    }

    /// Query parameters for block-request listings.
    #[derive(Debug, Clone, Default)]
    pub struct RequestListQuery {
        pub status: Option<RequestStatus>,
    }
}
