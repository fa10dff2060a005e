//! Domain models for the card ledger.

pub mod account_holder;
pub mod block_request;
pub mod card;
pub mod ledger_entry;

pub use account_holder::{AccountHolder, CallerContext, HolderId, Role};
pub use block_request::{BlockRequest, RequestId, RequestStatus};
pub use card::{Card, CardId, CardStatus, CardType};
pub use ledger_entry::{CardSnapshot, EntryId, EntryStatus, EntryType, LedgerEntry};
