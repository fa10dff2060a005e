//! # Domain Module
//!
//! Business logic for the card ledger: the transfer engine, the card
//! lifecycle manager, the block-request workflow, and the read-only query
//! facade. Services operate on the storage traits and never touch
//! transport or identity resolution directly; every operation takes a
//! resolved [`CallerContext`](models::CallerContext).

pub mod block_request_service;
pub mod card_service;
pub mod commands;
pub mod errors;
pub mod models;
pub mod query_service;
pub mod transfer_service;

pub use block_request_service::BlockRequestService;
pub use card_service::CardService;
pub use errors::{DomainError, DomainResult};
pub use query_service::QueryService;
pub use transfer_service::TransferService;
