//! In-memory ledger repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::models::{CardId, EntryId, EntryStatus, LedgerEntry};
use crate::storage::traits::{LedgerStorage, StorageError, StorageResult};

use super::MemoryConnection;

#[derive(Clone)]
pub struct LedgerRepository {
    connection: MemoryConnection,
}

impl LedgerRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        LedgerRepository { connection }
    }
}

fn newest_first(entries: &mut [LedgerEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl LedgerStorage for LedgerRepository {
    fn store_entry(&self, entry: &LedgerEntry) -> StorageResult<()> {
        let mut entries = self.connection.entries().lock().unwrap();
        if entries.contains_key(&entry.id) {
            return Err(StorageError::Duplicate(format!(
                "Ledger entry {} already exists",
                entry.id
            )));
        }
        if entries.values().any(|existing| {
            existing.transaction_id == entry.transaction_id
                || existing.reference_number == entry.reference_number
        }) {
            return Err(StorageError::Duplicate(
                "Transaction id or reference number already exists".to_string(),
            ));
        }
        entries.insert(entry.id, entry.clone());
        Ok(())
    }

    fn get_entry(&self, entry_id: EntryId) -> StorageResult<Option<LedgerEntry>> {
        let entries = self.connection.entries().lock().unwrap();
        Ok(entries.get(&entry_id).cloned())
    }

    fn list_entries_for_card(&self, card_id: CardId) -> StorageResult<Vec<LedgerEntry>> {
        let entries = self.connection.entries().lock().unwrap();
        let mut matching: Vec<LedgerEntry> = entries
            .values()
            .filter(|entry| entry.involves_card(card_id))
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }

    fn list_entries_for_cards(&self, card_ids: &[CardId]) -> StorageResult<Vec<LedgerEntry>> {
        let entries = self.connection.entries().lock().unwrap();
        let mut matching: Vec<LedgerEntry> = entries
            .values()
            .filter(|entry| entry.involves_any(card_ids))
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }

    fn list_all_entries(&self) -> StorageResult<Vec<LedgerEntry>> {
        let entries = self.connection.entries().lock().unwrap();
        let mut all: Vec<LedgerEntry> = entries.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }

    fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<LedgerEntry>> {
        let entries = self.connection.entries().lock().unwrap();
        let mut matching: Vec<LedgerEntry> = entries
            .values()
            .filter(|entry| entry.created_at >= start && entry.created_at < end)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }

    fn completed_outgoing_total(
        &self,
        card_id: CardId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Decimal> {
        let entries = self.connection.entries().lock().unwrap();
        let total = entries
            .values()
            .filter(|entry| {
                entry.status == EntryStatus::Completed
                    && entry.source_card_id() == Some(card_id)
                    && entry.created_at >= start
                    && entry.created_at < end
            })
            .map(|entry| entry.amount)
            .sum();
        Ok(total)
    }
}
