//! In-memory card repository.

use crate::domain::models::{Card, CardId, HolderId};
use crate::storage::traits::{CardStorage, StorageError, StorageResult};

use super::MemoryConnection;

#[derive(Clone)]
pub struct CardRepository {
    connection: MemoryConnection,
}

impl CardRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        CardRepository { connection }
    }
}

impl CardStorage for CardRepository {
    fn store_card(&self, card: &Card) -> StorageResult<()> {
        let mut cards = self.connection.cards().lock().unwrap();
        if cards.contains_key(&card.id) {
            return Err(StorageError::Duplicate(format!(
                "Card {} already exists",
                card.id
            )));
        }
        if cards
            .values()
            .any(|existing| existing.encrypted_number == card.encrypted_number)
        {
            return Err(StorageError::Duplicate(
                "Card number already exists".to_string(),
            ));
        }
        cards.insert(card.id, card.clone());
        Ok(())
    }

    fn update_card(&self, card: &Card) -> StorageResult<()> {
        let mut cards = self.connection.cards().lock().unwrap();
        match cards.get_mut(&card.id) {
            Some(existing) => {
                *existing = card.clone();
                Ok(())
            }
            None => Err(StorageError::Other(anyhow::anyhow!(
                "Card {} not found for update",
                card.id
            ))),
        }
    }

    fn get_card(&self, card_id: CardId) -> StorageResult<Option<Card>> {
        let cards = self.connection.cards().lock().unwrap();
        Ok(cards.get(&card_id).cloned())
    }

    fn card_exists(&self, card_id: CardId) -> StorageResult<bool> {
        let cards = self.connection.cards().lock().unwrap();
        Ok(cards.contains_key(&card_id))
    }

    fn list_cards_by_owner(&self, owner_id: HolderId) -> StorageResult<Vec<Card>> {
        let cards = self.connection.cards().lock().unwrap();
        let mut owned: Vec<Card> = cards
            .values()
            .filter(|card| card.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    fn list_all_cards(&self) -> StorageResult<Vec<Card>> {
        let cards = self.connection.cards().lock().unwrap();
        let mut all: Vec<Card> = cards.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn delete_card(&self, card_id: CardId) -> StorageResult<bool> {
        let mut cards = self.connection.cards().lock().unwrap();
        Ok(cards.remove(&card_id).is_some())
    }
}
