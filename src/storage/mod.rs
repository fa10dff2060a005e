//! # Storage Module
//!
//! Storage abstraction for the card ledger. The domain layer talks to the
//! traits in [`traits`]; [`memory`] provides the in-memory implementation
//! used here (a transactional relational backend slots in behind the same
//! traits). [`locks`] supplies the per-card mutual exclusion that stands in
//! for serializable isolation.

pub mod locks;
pub mod memory;
pub mod traits;
