//! In-memory block-request repository.

use crate::domain::models::{BlockRequest, CardId, HolderId, RequestId, RequestStatus};
use crate::storage::traits::{BlockRequestStorage, StorageError, StorageResult};

use super::MemoryConnection;

#[derive(Clone)]
pub struct BlockRequestRepository {
    connection: MemoryConnection,
}

impl BlockRequestRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        BlockRequestRepository { connection }
    }
}

impl BlockRequestStorage for BlockRequestRepository {
    fn store_request(&self, request: &BlockRequest) -> StorageResult<()> {
        let mut requests = self.connection.requests().lock().unwrap();
        if requests.contains_key(&request.id) {
            return Err(StorageError::Duplicate(format!(
                "Block request {} already exists",
                request.id
            )));
        }
        // The single-pending-per-card constraint is checked under the same
        // mutex as the insert, so two racing requesters get exactly one
        // winner.
        if request.is_pending()
            && requests
                .values()
                .any(|existing| existing.card_id == request.card_id && existing.is_pending())
        {
            return Err(StorageError::Duplicate(
                "There's already a pending block request for this card".to_string(),
            ));
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    fn update_request(&self, request: &BlockRequest) -> StorageResult<()> {
        let mut requests = self.connection.requests().lock().unwrap();
        match requests.get_mut(&request.id) {
            Some(existing) => {
                *existing = request.clone();
                Ok(())
            }
            None => Err(StorageError::Other(anyhow::anyhow!(
                "Block request {} not found for update",
                request.id
            ))),
        }
    }

    fn get_request(&self, request_id: RequestId) -> StorageResult<Option<BlockRequest>> {
        let requests = self.connection.requests().lock().unwrap();
        Ok(requests.get(&request_id).cloned())
    }

    fn pending_exists_for_card(&self, card_id: CardId) -> StorageResult<bool> {
        let requests = self.connection.requests().lock().unwrap();
        Ok(requests
            .values()
            .any(|request| request.card_id == card_id && request.is_pending()))
    }

    fn list_requests(&self, status: Option<RequestStatus>) -> StorageResult<Vec<BlockRequest>> {
        let requests = self.connection.requests().lock().unwrap();
        let mut matching: Vec<BlockRequest> = requests
            .values()
            .filter(|request| status.map_or(true, |s| request.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(matching)
    }

    fn list_requests_by_holder(&self, holder_id: HolderId) -> StorageResult<Vec<BlockRequest>> {
        let requests = self.connection.requests().lock().unwrap();
        let mut matching: Vec<BlockRequest> = requests
            .values()
            .filter(|request| request.requested_by == holder_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn pending_request(card_id: CardId) -> BlockRequest {
        BlockRequest {
            id: Uuid::new_v4(),
            card_id,
            requested_by: Uuid::new_v4(),
            reason: "lost card".to_string(),
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            processed_at: None,
            processed_by: None,
            admin_comment: None,
        }
    }

    #[test]
    fn second_pending_request_for_same_card_is_rejected() {
        let repo = BlockRequestRepository::new(MemoryConnection::new());
        let card = Uuid::new_v4();
        repo.store_request(&pending_request(card)).unwrap();
        let err = repo.store_request(&pending_request(card)).unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));
    }

    #[test]
    fn pending_request_allowed_once_prior_is_terminal() {
        let repo = BlockRequestRepository::new(MemoryConnection::new());
        let card = Uuid::new_v4();
        let mut first = pending_request(card);
        repo.store_request(&first).unwrap();

        first.status = RequestStatus::Rejected;
        first.processed_at = Some(Utc::now());
        repo.update_request(&first).unwrap();

        repo.store_request(&pending_request(card)).unwrap();
        assert!(repo.pending_exists_for_card(card).unwrap());
    }

    #[test]
    fn concurrent_requests_have_exactly_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let repo = Arc::new(BlockRequestRepository::new(MemoryConnection::new()));
        let card = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                thread::spawn(move || repo.store_request(&pending_request(card)).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|stored| *stored)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn list_requests_filters_by_status() {
        let repo = BlockRequestRepository::new(MemoryConnection::new());
        let mut processed = pending_request(Uuid::new_v4());
        repo.store_request(&processed).unwrap();
        processed.status = RequestStatus::Approved;
        repo.update_request(&processed).unwrap();
        repo.store_request(&pending_request(Uuid::new_v4())).unwrap();

        let pending = repo.list_requests(Some(RequestStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        let all = repo.list_requests(None).unwrap();
        assert_eq!(all.len(), 2);
    }
}
