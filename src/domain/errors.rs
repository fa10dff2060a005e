//! Domain error taxonomy.
//!
//! Every failure surfaced by a service carries a stable kind plus a
//! human-readable message, so callers can branch on the kind without
//! parsing messages.

use rust_decimal::Decimal;

use crate::storage::traits::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InsufficientFunds(String),
    #[error("{0}")]
    CardBlocked(String),
    #[error("{0}")]
    CardExpired(String),
    #[error("Transfer would exceed daily limit. Today spent: {spent}, daily limit: {limit}")]
    DailyLimitExceeded { spent: Decimal, limit: Decimal },
    /// Execution-phase fault; the persisted ledger entry carries the same
    /// cause as its failure reason.
    #[error("Transfer failed: {0}")]
    TransactionFailed(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    /// Stable kind identifier for transport-layer mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "not_found",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::BadRequest(_) => "bad_request",
            DomainError::Conflict(_) => "conflict",
            DomainError::InsufficientFunds(_) => "insufficient_funds",
            DomainError::CardBlocked(_) => "card_blocked",
            DomainError::CardExpired(_) => "card_expired",
            DomainError::DailyLimitExceeded { .. } => "daily_limit_exceeded",
            DomainError::TransactionFailed(_) => "transaction_failed",
            DomainError::Internal(_) => "internal",
        }
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(msg) => DomainError::Conflict(msg),
            StorageError::Other(inner) => DomainError::Internal(inner),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn storage_duplicate_maps_to_conflict() {
        let err: DomainError = StorageError::Duplicate("taken".to_string()).into();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn storage_other_maps_to_internal() {
        let err: DomainError = StorageError::Other(anyhow!("disk on fire")).into();
        assert_eq!(err.kind(), "internal");
    }
}
