//! Transaction and reference number generation.
//!
//! Formats follow the documented wire shapes; the random component comes
//! from a v4 uuid so collisions are negligible, and the ledger store still
//! enforces uniqueness as the final authority.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// `TXN-YYYYMMDDHHMMSS-XXXXXXXX` (8 uppercase hex chars).
pub fn generate_transaction_id(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "TXN-{}-{}",
        now.format("%Y%m%d%H%M%S"),
        random[..8].to_uppercase()
    )
}

/// `REF-XXXXXXXXXX` (10 uppercase hex chars).
pub fn generate_reference_number() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("REF-{}", random[..10].to_uppercase())
}
