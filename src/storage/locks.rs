//! Per-card mutual exclusion.
//!
//! The backing store here has no transaction manager, so the atomic unit is
//! made explicit: every balance- or status-mutating operation runs inside
//! [`CardLockManager::with_locks`] over the cards it touches. Locks are
//! acquired in ascending card-id order, which prevents deadlock when two
//! transfers target the same pair of cards in opposite directions, and are
//! released on every exit path via RAII guards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::models::CardId;

#[derive(Clone, Default)]
pub struct CardLockManager {
    locks: Arc<Mutex<HashMap<CardId, Arc<Mutex<()>>>>>,
}

impl CardLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_handle(&self, card_id: CardId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(card_id).or_default().clone()
    }

    /// Run `f` while holding exclusive locks on every card in `card_ids`.
    /// Duplicate ids are collapsed; acquisition order is ascending id.
    pub fn with_locks<T>(&self, card_ids: &[CardId], f: impl FnOnce() -> T) -> T {
        let mut ids: Vec<CardId> = card_ids.to_vec();
        ids.sort();
        ids.dedup();

        let handles: Vec<Arc<Mutex<()>>> = ids.iter().map(|id| self.lock_handle(*id)).collect();
        let _guards: Vec<_> = handles.iter().map(|h| h.lock().unwrap()).collect();
        f()
    }

    /// Drop the lock entry for a card that no longer exists.
    pub fn forget(&self, card_id: CardId) {
        self.locks.lock().unwrap().remove(&card_id);
    }
}
