//! Card lifecycle service: issuance, administrative updates, block and
//! unblock, and permanent deletion.

use std::sync::Arc;

use chrono::{Months, Utc};
use log::info;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::CardPolicy;
use crate::domain::commands::cards::{CreateCardCommand, UpdateCardCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CallerContext, Card, CardId, CardStatus};
use crate::storage::locks::CardLockManager;
use crate::storage::memory::{AccountHolderRepository, CardRepository, MemoryConnection};
use crate::storage::traits::{AccountHolderStorage, CardStorage};
use crate::util::{card_numbers, encryption::FieldCipher};

#[derive(Clone)]
pub struct CardService {
    cards: CardRepository,
    holders: AccountHolderRepository,
    locks: CardLockManager,
    policy: CardPolicy,
    cipher: Arc<dyn FieldCipher>,
}

impl CardService {
    pub fn new(
        connection: MemoryConnection,
        locks: CardLockManager,
        policy: CardPolicy,
        cipher: Arc<dyn FieldCipher>,
    ) -> Self {
        CardService {
            cards: CardRepository::new(connection.clone()),
            holders: AccountHolderRepository::new(connection),
            locks,
            policy,
            cipher,
        }
    }

    /// Issue a new card for the caller.
    pub fn create_card(
        &self,
        caller: &CallerContext,
        command: CreateCardCommand,
    ) -> DomainResult<Card> {
        let holder = self
            .holders
            .get_holder(caller.account_holder_id)?
            .ok_or_else(|| DomainError::NotFound("Account holder not found".to_string()))?;

        if command.initial_balance.is_some_and(|b| b < Decimal::ZERO) {
            return Err(DomainError::BadRequest(
                "Initial balance cannot be negative".to_string(),
            ));
        }
        if command.daily_limit.is_some_and(|l| l < Decimal::ZERO) {
            return Err(DomainError::BadRequest(
                "Daily limit cannot be negative".to_string(),
            ));
        }

        let card_number = card_numbers::generate_card_number();
        let cvv = card_numbers::generate_cvv();
        let now = Utc::now();
        let today = now.date_naive();

        let card = Card {
            id: Uuid::new_v4(),
            encrypted_number: self.cipher.encrypt(&card_number),
            encrypted_cvv: self.cipher.encrypt(&cvv),
            masked_number: card_numbers::mask_card_number(&card_number),
            holder_name: command.holder_name.unwrap_or_else(|| holder.full_name.clone()),
            card_type: command.card_type,
            status: CardStatus::Active,
            balance: command.initial_balance.unwrap_or(Decimal::ZERO),
            daily_limit: Some(
                command
                    .daily_limit
                    .unwrap_or(self.policy.default_daily_limit),
            ),
            expiry_date: today
                .checked_add_months(Months::new(self.policy.validity_years * 12))
                .unwrap_or(today),
            block_reason: None,
            blocked_at: None,
            owner_id: holder.id,
            created_at: now,
            updated_at: now,
        };

        self.cards.store_card(&card)?;
        info!(
            "Card created for holder {} with masked number {}",
            holder.username, card.masked_number
        );
        Ok(card)
    }

    /// Administrative partial update. Setting the status to Blocked through
    /// this path stamps the block time but requires no reason, unlike
    /// [`CardService::block_card`].
    pub fn update_card_admin(
        &self,
        caller: &CallerContext,
        card_id: CardId,
        command: UpdateCardCommand,
    ) -> DomainResult<Card> {
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "Only administrators can update cards".to_string(),
            ));
        }
        if command.daily_limit.is_some_and(|l| l < Decimal::ZERO) {
            return Err(DomainError::BadRequest(
                "Daily limit cannot be negative".to_string(),
            ));
        }

        self.locks.with_locks(&[card_id], || {
            let mut card = self.get_existing(card_id)?;

            if let Some(status) = command.status {
                card.status = status;
                if status == CardStatus::Blocked {
                    card.blocked_at = Some(Utc::now());
                }
            }
            if let Some(limit) = command.daily_limit {
                card.daily_limit = Some(limit);
            }
            card.updated_at = Utc::now();

            self.cards.update_card(&card)?;
            info!("Card {} updated by admin {}", card_id, caller.account_holder_id);
            Ok(card)
        })
    }

    pub fn block_card(
        &self,
        caller: &CallerContext,
        card_id: CardId,
        reason: String,
    ) -> DomainResult<Card> {
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "Only administrators can block cards".to_string(),
            ));
        }

        self.locks.with_locks(&[card_id], || {
            let mut card = self.get_existing(card_id)?;
            if card.status == CardStatus::Blocked {
                return Err(DomainError::BadRequest(
                    "Card is already blocked".to_string(),
                ));
            }

            card.status = CardStatus::Blocked;
            card.block_reason = Some(reason.clone());
            card.blocked_at = Some(Utc::now());
            card.updated_at = Utc::now();

            self.cards.update_card(&card)?;
            info!("Card {} blocked by admin {}", card_id, caller.account_holder_id);
            Ok(card)
        })
    }

    pub fn unblock_card(&self, caller: &CallerContext, card_id: CardId) -> DomainResult<Card> {
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "Only administrators can unblock cards".to_string(),
            ));
        }

        self.locks.with_locks(&[card_id], || {
            let mut card = self.get_existing(card_id)?;
            if card.status != CardStatus::Blocked {
                return Err(DomainError::BadRequest("Card is not blocked".to_string()));
            }

            card.status = CardStatus::Active;
            card.block_reason = None;
            card.blocked_at = None;
            card.updated_at = Utc::now();

            self.cards.update_card(&card)?;
            info!("Card {} unblocked by admin {}", card_id, caller.account_holder_id);
            Ok(card)
        })
    }

    /// Permanently remove a card. Ledger entries and block requests are not
    /// cascaded; history stays readable through the snapshots they carry.
    pub fn delete_card(&self, caller: &CallerContext, card_id: CardId) -> DomainResult<()> {
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "Only administrators can delete cards".to_string(),
            ));
        }

        self.locks.with_locks(&[card_id], || {
            if !self.cards.card_exists(card_id)? {
                return Err(DomainError::NotFound("Card not found".to_string()));
            }
            self.cards.delete_card(card_id)?;
            Ok(())
        })?;

        self.locks.forget(card_id);
        info!("Card {} deleted by admin {}", card_id, caller.account_holder_id);
        Ok(())
    }

    fn get_existing(&self, card_id: CardId) -> DomainResult<Card> {
        self.cards
            .get_card(card_id)?
            .ok_or_else(|| DomainError::NotFound("Card not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AccountHolder, CardType, Role};
    use crate::util::encryption::XorCipher;

    fn create_test_service() -> (CardService, MemoryConnection) {
        let connection = MemoryConnection::new();
        let service = CardService::new(
            connection.clone(),
            CardLockManager::new(),
            CardPolicy::default(),
            Arc::new(XorCipher::new("test-key")),
        );
        (service, connection)
    }

    fn create_holder(connection: &MemoryConnection, username: &str, roles: Vec<Role>) -> CallerContext {
        let holder = AccountHolder {
            id: Uuid::new_v4(),
            username: username.to_string(),
            full_name: format!("{username} Fullname"),
            email: format!("{username}@example.com"),
            roles,
        };
        AccountHolderRepository::new(connection.clone())
            .store_holder(&holder)
            .unwrap();
        CallerContext::for_holder(&holder)
    }

    fn debit_card_command() -> CreateCardCommand {
        CreateCardCommand {
            card_type: CardType::Debit,
            holder_name: None,
            daily_limit: None,
            initial_balance: None,
        }
    }

    #[test]
    fn create_card_applies_policy_defaults() {
        let (service, connection) = create_test_service();
        let caller = create_holder(&connection, "alice", vec![Role::User]);

        let card = service.create_card(&caller, debit_card_command()).unwrap();

        assert_eq!(card.status, CardStatus::Active);
        assert_eq!(card.balance, Decimal::ZERO);
        assert_eq!(card.daily_limit, Some(CardPolicy::default().default_daily_limit));
        assert_eq!(card.holder_name, "alice Fullname");
        assert_eq!(card.owner_id, caller.account_holder_id);
        let expected_expiry = Utc::now()
            .date_naive()
            .checked_add_months(Months::new(36))
            .unwrap();
        assert_eq!(card.expiry_date, expected_expiry);
        assert!(card.masked_number.starts_with("**** **** **** "));
        assert_ne!(card.encrypted_number, card.masked_number);
    }

    #[test]
    fn create_card_rejects_negative_balance_and_limit() {
        let (service, connection) = create_test_service();
        let caller = create_holder(&connection, "alice", vec![Role::User]);

        let err = service
            .create_card(
                &caller,
                CreateCardCommand {
                    initial_balance: Some(Decimal::new(-100_00, 2)),
                    ..debit_card_command()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(msg) if msg.contains("Initial balance")));

        let err = service
            .create_card(
                &caller,
                CreateCardCommand {
                    daily_limit: Some(Decimal::new(-5_00, 2)),
                    ..debit_card_command()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(msg) if msg.contains("Daily limit")));

        // Nothing was stored for either rejected command.
        let cards = CardRepository::new(connection)
            .list_cards_by_owner(caller.account_holder_id)
            .unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn admin_update_rejects_negative_daily_limit() {
        let (service, connection) = create_test_service();
        let user = create_holder(&connection, "alice", vec![Role::User]);
        let admin = create_holder(&connection, "admin", vec![Role::Admin]);
        let card = service.create_card(&user, debit_card_command()).unwrap();

        let err = service
            .update_card_admin(
                &admin,
                card.id,
                UpdateCardCommand {
                    status: None,
                    daily_limit: Some(Decimal::new(-1_00, 2)),
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[test]
    fn create_card_for_unknown_holder_fails() {
        let (service, _connection) = create_test_service();
        let caller = CallerContext::new(Uuid::new_v4(), vec![Role::User]);
        let err = service.create_card(&caller, debit_card_command()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn block_requires_admin() {
        let (service, connection) = create_test_service();
        let user = create_holder(&connection, "alice", vec![Role::User]);
        let card = service.create_card(&user, debit_card_command()).unwrap();

        let err = service
            .block_card(&user, card.id, "fraud".to_string())
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn block_then_unblock_round_trip() {
        let (service, connection) = create_test_service();
        let user = create_holder(&connection, "alice", vec![Role::User]);
        let admin = create_holder(&connection, "admin", vec![Role::User, Role::Admin]);
        let card = service.create_card(&user, debit_card_command()).unwrap();

        let blocked = service
            .block_card(&admin, card.id, "reported stolen".to_string())
            .unwrap();
        assert_eq!(blocked.status, CardStatus::Blocked);
        assert_eq!(blocked.block_reason.as_deref(), Some("reported stolen"));
        assert!(blocked.blocked_at.is_some());

        // Blocking twice is a BadRequest.
        let err = service
            .block_card(&admin, card.id, "again".to_string())
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));

        let unblocked = service.unblock_card(&admin, card.id).unwrap();
        assert_eq!(unblocked.status, CardStatus::Active);
        assert!(unblocked.block_reason.is_none());
        assert!(unblocked.blocked_at.is_none());
    }

    #[test]
    fn unblock_of_non_blocked_card_is_bad_request() {
        let (service, connection) = create_test_service();
        let user = create_holder(&connection, "alice", vec![Role::User]);
        let admin = create_holder(&connection, "admin", vec![Role::Admin]);
        let card = service.create_card(&user, debit_card_command()).unwrap();

        let err = service.unblock_card(&admin, card.id).unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[test]
    fn admin_update_to_blocked_stamps_block_time_without_reason() {
        let (service, connection) = create_test_service();
        let user = create_holder(&connection, "alice", vec![Role::User]);
        let admin = create_holder(&connection, "admin", vec![Role::Admin]);
        let card = service.create_card(&user, debit_card_command()).unwrap();

        let updated = service
            .update_card_admin(
                &admin,
                card.id,
                UpdateCardCommand {
                    status: Some(CardStatus::Blocked),
                    daily_limit: Some(Decimal::new(250_00, 2)),
                },
            )
            .unwrap();

        assert_eq!(updated.status, CardStatus::Blocked);
        assert!(updated.blocked_at.is_some());
        assert!(updated.block_reason.is_none());
        assert_eq!(updated.daily_limit, Some(Decimal::new(250_00, 2)));
    }

    #[test]
    fn delete_is_admin_only_and_reports_missing_cards() {
        let (service, connection) = create_test_service();
        let user = create_holder(&connection, "alice", vec![Role::User]);
        let admin = create_holder(&connection, "admin", vec![Role::Admin]);
        let card = service.create_card(&user, debit_card_command()).unwrap();

        let err = service.delete_card(&user, card.id).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        service.delete_card(&admin, card.id).unwrap();
        let err = service.delete_card(&admin, card.id).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
