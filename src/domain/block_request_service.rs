//! Block-request workflow: account holders ask for a card to be blocked,
//! administrators approve or reject.

use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::domain::commands::block_requests::{ProcessBlockRequestCommand, RequestBlockCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{BlockRequest, CallerContext, CardStatus, RequestStatus};
use crate::storage::locks::CardLockManager;
use crate::storage::memory::{
    AccountHolderRepository, BlockRequestRepository, CardRepository, MemoryConnection,
};
use crate::storage::traits::{AccountHolderStorage, BlockRequestStorage, CardStorage};

#[derive(Clone)]
pub struct BlockRequestService {
    cards: CardRepository,
    requests: BlockRequestRepository,
    holders: AccountHolderRepository,
    locks: CardLockManager,
}

impl BlockRequestService {
    pub fn new(connection: MemoryConnection, locks: CardLockManager) -> Self {
        BlockRequestService {
            cards: CardRepository::new(connection.clone()),
            requests: BlockRequestRepository::new(connection.clone()),
            holders: AccountHolderRepository::new(connection),
            locks,
        }
    }

    /// File a block request for one of the caller's own cards. At most one
    /// pending request may exist per card; the store enforces this
    /// atomically, so of two racing callers exactly one wins and the other
    /// receives Conflict.
    pub fn request_block(
        &self,
        caller: &CallerContext,
        command: RequestBlockCommand,
    ) -> DomainResult<BlockRequest> {
        if !self.holders.holder_exists(caller.account_holder_id)? {
            return Err(DomainError::NotFound("Account holder not found".to_string()));
        }
        let card = self
            .cards
            .get_card(command.card_id)?
            .ok_or_else(|| DomainError::NotFound("Card not found".to_string()))?;

        if !card.is_owned_by(caller.account_holder_id) {
            return Err(DomainError::Forbidden(
                "You can only request to block your own cards".to_string(),
            ));
        }
        if card.status == CardStatus::Blocked {
            return Err(DomainError::BadRequest(
                "Card is already blocked".to_string(),
            ));
        }

        let request = BlockRequest {
            id: Uuid::new_v4(),
            card_id: card.id,
            requested_by: caller.account_holder_id,
            reason: command.reason,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            processed_at: None,
            processed_by: None,
            admin_comment: None,
        };
        self.requests.store_request(&request)?;
        info!(
            "Block request created for card {} by holder {}",
            card.id, caller.account_holder_id
        );
        Ok(request)
    }

    /// Approve or reject a pending request. Approval transitions the card
    /// to Blocked with the request's reason.
    pub fn process_request(
        &self,
        caller: &CallerContext,
        command: ProcessBlockRequestCommand,
    ) -> DomainResult<()> {
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "Only administrators can process block requests".to_string(),
            ));
        }
        if !self.holders.holder_exists(caller.account_holder_id)? {
            return Err(DomainError::NotFound("Admin account not found".to_string()));
        }

        let card_id = self
            .requests
            .get_request(command.request_id)?
            .ok_or_else(|| DomainError::NotFound("Block request not found".to_string()))?
            .card_id;

        // The whole read-check-write runs under the card's lock, so two
        // admins deciding the same request serialize and the loser sees a
        // request that is no longer pending.
        self.locks.with_locks(&[card_id], || -> DomainResult<()> {
            let mut request = self
                .requests
                .get_request(command.request_id)?
                .ok_or_else(|| DomainError::NotFound("Block request not found".to_string()))?;
            if !request.is_pending() {
                return Err(DomainError::BadRequest(
                    "Block request has already been processed".to_string(),
                ));
            }

            if command.approve {
                let mut card = self
                    .cards
                    .get_card(request.card_id)?
                    .ok_or_else(|| DomainError::NotFound("Card not found".to_string()))?;
                card.status = CardStatus::Blocked;
                card.block_reason = Some(request.reason.clone());
                card.blocked_at = Some(Utc::now());
                card.updated_at = Utc::now();
                self.cards.update_card(&card)?;
            }

            request.status = if command.approve {
                RequestStatus::Approved
            } else {
                RequestStatus::Rejected
            };
            request.processed_at = Some(Utc::now());
            request.processed_by = Some(caller.account_holder_id);
            request.admin_comment = command.admin_comment.clone();
            self.requests.update_request(&request)?;
            Ok(())
        })?;

        info!(
            "Block request {} {} by admin {}",
            command.request_id,
            if command.approve { "approved" } else { "rejected" },
            caller.account_holder_id
        );
        Ok(())
    }
}
