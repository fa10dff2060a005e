//! In-memory storage backend.
//!
//! Repositories share a [`MemoryConnection`] the way the relational
//! repositories would share a pool. Uniqueness constraints are checked
//! under each map's mutex, so a violating insert and its winner cannot
//! interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::models::{
    AccountHolder, BlockRequest, Card, CardId, EntryId, HolderId, LedgerEntry, RequestId,
};

mod account_holder_repository;
mod block_request_repository;
mod card_repository;
mod ledger_repository;

pub use account_holder_repository::AccountHolderRepository;
pub use block_request_repository::BlockRequestRepository;
pub use card_repository::CardRepository;
pub use ledger_repository::LedgerRepository;

#[derive(Default)]
struct Inner {
    cards: Mutex<HashMap<CardId, Card>>,
    entries: Mutex<HashMap<EntryId, LedgerEntry>>,
    requests: Mutex<HashMap<RequestId, BlockRequest>>,
    holders: Mutex<HashMap<HolderId, AccountHolder>>,
}

/// Shared handle over the in-memory tables.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    inner: Arc<Inner>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cards(&self) -> &Mutex<HashMap<CardId, Card>> {
        &self.inner.cards
    }

    pub(crate) fn entries(&self) -> &Mutex<HashMap<EntryId, LedgerEntry>> {
        &self.inner.entries
    }

    pub(crate) fn requests(&self) -> &Mutex<HashMap<RequestId, BlockRequest>> {
        &self.inner.requests
    }

    pub(crate) fn holders(&self) -> &Mutex<HashMap<HolderId, AccountHolder>> {
        &self.inner.holders
    }
}
