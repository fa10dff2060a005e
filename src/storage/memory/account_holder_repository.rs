//! In-memory account-holder projection store.

use crate::domain::models::{AccountHolder, HolderId};
use crate::storage::traits::{AccountHolderStorage, StorageError, StorageResult};

use super::MemoryConnection;

#[derive(Clone)]
pub struct AccountHolderRepository {
    connection: MemoryConnection,
}

impl AccountHolderRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        AccountHolderRepository { connection }
    }
}

impl AccountHolderStorage for AccountHolderRepository {
    fn store_holder(&self, holder: &AccountHolder) -> StorageResult<()> {
        let mut holders = self.connection.holders().lock().unwrap();
        if holders.contains_key(&holder.id) {
            return Err(StorageError::Duplicate(format!(
                "Account holder {} already exists",
                holder.id
            )));
        }
        if holders
            .values()
            .any(|existing| existing.username == holder.username)
        {
            return Err(StorageError::Duplicate(format!(
                "Username {} is already taken",
                holder.username
            )));
        }
        holders.insert(holder.id, holder.clone());
        Ok(())
    }

    fn get_holder(&self, holder_id: HolderId) -> StorageResult<Option<AccountHolder>> {
        let holders = self.connection.holders().lock().unwrap();
        Ok(holders.get(&holder_id).cloned())
    }

    fn holder_exists(&self, holder_id: HolderId) -> StorageResult<bool> {
        let holders = self.connection.holders().lock().unwrap();
        Ok(holders.contains_key(&holder_id))
    }
}
