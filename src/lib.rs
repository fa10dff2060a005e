//! # cardledger
//!
//! Ledger and transfer engine for bank-card accounts.
//!
//! This crate covers the parts of a card-management service that carry real
//! invariants: card balance bookkeeping, money transfers between a holder's
//! own cards (with isolation and limit enforcement), the card lifecycle
//! state machine, and the block-request review workflow.
//!
//! ## Module Organization
//!
//! - **domain**: services, models, commands and the error taxonomy
//! - **storage**: storage traits, the per-card lock manager, and the
//!   in-memory repository implementations
//! - **util**: card-number generation/masking, transaction id generation,
//!   and the field-encryption seam
//!
//! Authentication, HTTP transport, and the durable relational backend are
//! external collaborators; services receive an already-resolved
//! [`CallerContext`](domain::models::CallerContext) and talk to storage
//! through the traits in [`storage::traits`].

use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod storage;
pub mod util;

pub use config::CardPolicy;
pub use domain::errors::{DomainError, DomainResult};

use domain::block_request_service::BlockRequestService;
use domain::card_service::CardService;
use domain::query_service::QueryService;
use domain::transfer_service::TransferService;
use storage::locks::CardLockManager;
use storage::memory::{AccountHolderRepository, MemoryConnection};
use util::encryption::{FieldCipher, XorCipher};

/// Main entry point that wires all services over a shared connection.
pub struct CardLedger {
    pub card_service: CardService,
    pub transfer_service: TransferService,
    pub block_request_service: BlockRequestService,
    pub query_service: QueryService,
    /// Identity projection store. Populated by the identity-resolution
    /// collaborator; exposed here so callers can register account holders.
    pub holders: AccountHolderRepository,
}

impl CardLedger {
    pub fn new(policy: CardPolicy) -> Self {
        let cipher: Arc<dyn FieldCipher> = Arc::new(XorCipher::new("cardledger-dev-key"));
        Self::with_cipher(policy, cipher)
    }

    /// Wire the services with a caller-supplied field cipher (the production
    /// encryption mechanism is an external collaborator).
    pub fn with_cipher(policy: CardPolicy, cipher: Arc<dyn FieldCipher>) -> Self {
        let connection = MemoryConnection::new();
        let locks = CardLockManager::new();

        let card_service = CardService::new(
            connection.clone(),
            locks.clone(),
            policy.clone(),
            cipher.clone(),
        );
        let transfer_service = TransferService::new(connection.clone(), locks.clone(), policy.clone());
        let block_request_service = BlockRequestService::new(connection.clone(), locks.clone());
        let query_service = QueryService::new(connection.clone());
        let holders = AccountHolderRepository::new(connection);

        CardLedger {
            card_service,
            transfer_service,
            block_request_service,
            query_service,
            holders,
        }
    }
}

impl Default for CardLedger {
    fn default() -> Self {
        Self::new(CardPolicy::default())
    }
}
