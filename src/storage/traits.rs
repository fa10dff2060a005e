//! # Storage Traits
//!
//! Interfaces the domain layer uses to persist and query cards, ledger
//! entries, block requests, and account-holder projections. Implementations
//! must enforce the uniqueness constraints documented per method and report
//! violations as [`StorageError::Duplicate`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::models::{
    AccountHolder, BlockRequest, Card, CardId, EntryId, HolderId, LedgerEntry, RequestId,
    RequestStatus,
};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Duplicate(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Card rows. The encrypted card number is unique across all cards.
pub trait CardStorage: Send + Sync {
    fn store_card(&self, card: &Card) -> StorageResult<()>;

    fn update_card(&self, card: &Card) -> StorageResult<()>;

    fn get_card(&self, card_id: CardId) -> StorageResult<Option<Card>>;

    fn card_exists(&self, card_id: CardId) -> StorageResult<bool>;

    /// Ordered by creation time descending.
    fn list_cards_by_owner(&self, owner_id: HolderId) -> StorageResult<Vec<Card>>;

    /// Ordered by creation time descending.
    fn list_all_cards(&self) -> StorageResult<Vec<Card>>;

    /// Returns true if a row was removed.
    fn delete_card(&self, card_id: CardId) -> StorageResult<bool>;
}

/// Ledger entries, append-mostly. Transaction ids and reference numbers are
/// unique across all entries.
pub trait LedgerStorage: Send + Sync {
    fn store_entry(&self, entry: &LedgerEntry) -> StorageResult<()>;

    fn get_entry(&self, entry_id: EntryId) -> StorageResult<Option<LedgerEntry>>;

    /// Entries where the card appears as source or destination, newest
    /// first.
    fn list_entries_for_card(&self, card_id: CardId) -> StorageResult<Vec<LedgerEntry>>;

    /// Entries involving any of the given cards, newest first.
    fn list_entries_for_cards(&self, card_ids: &[CardId]) -> StorageResult<Vec<LedgerEntry>>;

    /// All entries, newest first.
    fn list_all_entries(&self) -> StorageResult<Vec<LedgerEntry>>;

    /// Entries created in `[start, end)`, oldest first.
    fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<LedgerEntry>>;

    /// Sum of completed outgoing amounts from the card for entries created
    /// in `[start, end)`.
    fn completed_outgoing_total(
        &self,
        card_id: CardId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Decimal>;
}

/// Block requests. At most one pending request may exist per card; a store
/// of a second pending request must fail with [`StorageError::Duplicate`]
/// atomically, so concurrent requesters get exactly one winner.
pub trait BlockRequestStorage: Send + Sync {
    fn store_request(&self, request: &BlockRequest) -> StorageResult<()>;

    fn update_request(&self, request: &BlockRequest) -> StorageResult<()>;

    fn get_request(&self, request_id: RequestId) -> StorageResult<Option<BlockRequest>>;

    fn pending_exists_for_card(&self, card_id: CardId) -> StorageResult<bool>;

    /// Newest first, optionally filtered by status.
    fn list_requests(&self, status: Option<RequestStatus>) -> StorageResult<Vec<BlockRequest>>;

    /// Requests created by the holder, newest first.
    fn list_requests_by_holder(&self, holder_id: HolderId) -> StorageResult<Vec<BlockRequest>>;
}

/// Account-holder projections maintained by the identity collaborator.
/// Usernames are unique.
pub trait AccountHolderStorage: Send + Sync {
    fn store_holder(&self, holder: &AccountHolder) -> StorageResult<()>;

    fn get_holder(&self, holder_id: HolderId) -> StorageResult<Option<AccountHolder>>;

    fn holder_exists(&self, holder_id: HolderId) -> StorageResult<bool>;
}
