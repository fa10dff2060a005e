//! Domain model for a bank card.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account_holder::HolderId;

pub type CardId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    Active,
    Blocked,
    Expired,
    PendingActivation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    Debit,
    Credit,
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Opaque ciphertext of the full card number; unique across all cards.
    pub encrypted_number: String,
    pub encrypted_cvv: String,
    /// Display form, e.g. `**** **** **** 1234`.
    pub masked_number: String,
    pub holder_name: String,
    pub card_type: CardType,
    /// Stored status. Use [`Card::effective_status`] for validation; expiry
    /// is derived at read time and never written back.
    pub status: CardStatus,
    pub balance: Decimal,
    pub daily_limit: Option<Decimal>,
    pub expiry_date: NaiveDate,
    pub block_reason: Option<String>,
    pub blocked_at: Option<DateTime<Utc>>,
    pub owner_id: HolderId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Status as observed on `today`: a past expiry date presents as
    /// `Expired` regardless of the stored status, but the stored status is
    /// never overwritten (a blocked card keeps its block reason).
    pub fn effective_status(&self, today: NaiveDate) -> CardStatus {
        if self.status != CardStatus::Expired && today > self.expiry_date {
            CardStatus::Expired
        } else {
            self.status
        }
    }

    pub fn is_owned_by(&self, holder_id: HolderId) -> bool {
        self.owner_id == holder_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn card_with(status: CardStatus, expiry: NaiveDate) -> Card {
        Card {
            id: Uuid::new_v4(),
            encrypted_number: "ct".to_string(),
            encrypted_cvv: "ct".to_string(),
            masked_number: "**** **** **** 1234".to_string(),
            holder_name: "Test Holder".to_string(),
            card_type: CardType::Debit,
            status,
            balance: Decimal::ZERO,
            daily_limit: None,
            expiry_date: expiry,
            block_reason: None,
            blocked_at: None,
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn active_card_within_validity_stays_active() {
        let today = Utc::now().date_naive();
        let card = card_with(CardStatus::Active, today + Duration::days(30));
        assert_eq!(card.effective_status(today), CardStatus::Active);
    }

    #[test]
    fn expiry_on_the_exact_date_is_still_valid() {
        let today = Utc::now().date_naive();
        let card = card_with(CardStatus::Active, today);
        assert_eq!(card.effective_status(today), CardStatus::Active);
    }

    #[test]
    fn past_expiry_presents_as_expired() {
        let today = Utc::now().date_naive();
        let card = card_with(CardStatus::Active, today - Duration::days(1));
        assert_eq!(card.effective_status(today), CardStatus::Expired);
    }

    #[test]
    fn blocked_card_past_expiry_presents_as_expired_but_keeps_stored_status() {
        let today = Utc::now().date_naive();
        let card = card_with(CardStatus::Blocked, today - Duration::days(1));
        assert_eq!(card.effective_status(today), CardStatus::Expired);
        assert_eq!(card.status, CardStatus::Blocked);
    }
}
