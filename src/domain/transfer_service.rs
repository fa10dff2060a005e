//! Transfer engine.
//!
//! Validates and executes balance-moving transfers between two cards owned
//! by the same caller. The whole operation runs while holding both cards'
//! locks, so concurrent transfers sharing a card serialize and no partial
//! balance state is ever observable.
//!
//! Precondition failures surface a typed error and persist nothing.
//! Execution-phase failures persist a Failed ledger entry whose failure
//! reason matches the surfaced `TransactionFailed` error.

use chrono::{Local, NaiveDate, Utc};
use log::{error, info};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::CardPolicy;
use crate::domain::commands::transfers::TransferCommand;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    CallerContext, Card, CardSnapshot, CardStatus, EntryStatus, EntryType, LedgerEntry,
};
use crate::storage::locks::CardLockManager;
use crate::storage::memory::{
    AccountHolderRepository, CardRepository, LedgerRepository, MemoryConnection,
};
use crate::storage::traits::{AccountHolderStorage, CardStorage, LedgerStorage};
use crate::util::{ids, local_day_bounds};

#[derive(Clone)]
pub struct TransferService {
    cards: CardRepository,
    ledger: LedgerRepository,
    holders: AccountHolderRepository,
    locks: CardLockManager,
    policy: CardPolicy,
}

impl TransferService {
    pub fn new(connection: MemoryConnection, locks: CardLockManager, policy: CardPolicy) -> Self {
        TransferService {
            cards: CardRepository::new(connection.clone()),
            ledger: LedgerRepository::new(connection.clone()),
            holders: AccountHolderRepository::new(connection),
            locks,
            policy,
        }
    }

    /// Transfer `command.amount` from the caller's source card to the
    /// caller's destination card, producing a completed ledger entry.
    pub fn transfer(
        &self,
        caller: &CallerContext,
        command: TransferCommand,
    ) -> DomainResult<LedgerEntry> {
        let lock_ids = [command.source_card_id, command.destination_card_id];
        self.locks
            .with_locks(&lock_ids, || self.transfer_locked(caller, &command))
    }

    fn transfer_locked(
        &self,
        caller: &CallerContext,
        command: &TransferCommand,
    ) -> DomainResult<LedgerEntry> {
        if !self.holders.holder_exists(caller.account_holder_id)? {
            return Err(DomainError::NotFound("Account holder not found".to_string()));
        }

        let source = self
            .cards
            .get_card(command.source_card_id)?
            .ok_or_else(|| DomainError::NotFound("Source card not found".to_string()))?;
        let destination = self
            .cards
            .get_card(command.destination_card_id)?
            .ok_or_else(|| DomainError::NotFound("Destination card not found".to_string()))?;

        if !source.is_owned_by(caller.account_holder_id) {
            return Err(DomainError::Forbidden(
                "You can only transfer from your own cards".to_string(),
            ));
        }
        if !destination.is_owned_by(caller.account_holder_id) {
            return Err(DomainError::Forbidden(
                "You can only transfer to your own cards".to_string(),
            ));
        }

        if source.id == destination.id {
            return Err(DomainError::BadRequest(
                "Cannot transfer to the same card".to_string(),
            ));
        }

        let today = Local::now().date_naive();
        check_card_usable(&source, "Source", today)?;
        check_card_usable(&destination, "Destination", today)?;

        if command.amount <= Decimal::ZERO {
            return Err(DomainError::BadRequest(
                "Transfer amount must be greater than zero".to_string(),
            ));
        }
        if command.amount > self.policy.max_transfer_amount {
            return Err(DomainError::BadRequest(format!(
                "Transfer amount exceeds maximum limit: {}",
                self.policy.max_transfer_amount
            )));
        }

        if source.balance < command.amount {
            return Err(DomainError::InsufficientFunds(
                "Insufficient funds on source card".to_string(),
            ));
        }
        if source.balance - command.amount < self.policy.min_balance {
            return Err(DomainError::InsufficientFunds(format!(
                "Transfer would result in balance below minimum required: {}",
                self.policy.min_balance
            )));
        }

        self.check_daily_limit(&source, command.amount)?;

        self.execute(source, destination, command)
    }

    fn check_daily_limit(&self, source: &Card, amount: Decimal) -> DomainResult<()> {
        let Some(limit) = source.daily_limit else {
            return Ok(());
        };
        let (start_of_day, start_of_next_day) = local_day_bounds(Local::now());
        let spent =
            self.ledger
                .completed_outgoing_total(source.id, start_of_day, start_of_next_day)?;
        if spent + amount > limit {
            return Err(DomainError::DailyLimitExceeded { spent, limit });
        }
        Ok(())
    }

    /// Execution phase. All preconditions have passed; from here on any
    /// fault is recorded into a Failed ledger entry.
    fn execute(
        &self,
        mut source: Card,
        mut destination: Card,
        command: &TransferCommand,
    ) -> DomainResult<LedgerEntry> {
        let now = Utc::now();
        let mut entry = LedgerEntry {
            id: Uuid::new_v4(),
            transaction_id: ids::generate_transaction_id(now),
            reference_number: ids::generate_reference_number(),
            entry_type: EntryType::Transfer,
            status: EntryStatus::Pending,
            amount: command.amount,
            source: Some(CardSnapshot::of(&source)),
            destination: Some(CardSnapshot::of(&destination)),
            description: command
                .description
                .clone()
                .unwrap_or_else(|| "Transfer between own cards".to_string()),
            balance_before: Some(source.balance),
            balance_after: None,
            created_at: now,
            processed_at: None,
            failure_reason: None,
        };

        let result = (|| -> anyhow::Result<()> {
            source.balance -= command.amount;
            destination.balance += command.amount;
            source.updated_at = Utc::now();
            destination.updated_at = Utc::now();

            entry.balance_after = Some(source.balance);
            entry.status = EntryStatus::Completed;
            entry.processed_at = Some(Utc::now());

            self.cards
                .update_card(&source)
                .map_err(anyhow::Error::from)?;
            self.cards
                .update_card(&destination)
                .map_err(anyhow::Error::from)?;
            self.ledger.store_entry(&entry).map_err(anyhow::Error::from)
        })();

        match result {
            Ok(()) => {
                info!(
                    "Transfer completed: {} from card {} to card {}",
                    command.amount, source.id, destination.id
                );
                Ok(entry)
            }
            Err(cause) => {
                entry.status = EntryStatus::Failed;
                entry.failure_reason = Some(cause.to_string());
                entry.balance_after = None;
                entry.processed_at = None;
                if let Err(store_err) = self.ledger.store_entry(&entry) {
                    error!(
                        "Failed to persist failure record for {}: {}",
                        entry.transaction_id, store_err
                    );
                }
                error!("Transfer failed: {}", cause);
                Err(DomainError::TransactionFailed(cause.to_string()))
            }
        }
    }
}

/// Three-way status rule: blocked and expired get their own error kinds so
/// callers can react differently; any other non-active status is generic.
fn check_card_usable(card: &Card, label: &str, today: NaiveDate) -> DomainResult<()> {
    match card.effective_status(today) {
        CardStatus::Active => Ok(()),
        CardStatus::Blocked => Err(DomainError::CardBlocked(format!(
            "{label} card is blocked"
        ))),
        CardStatus::Expired => Err(DomainError::CardExpired(format!(
            "{label} card has expired"
        ))),
        _ => Err(DomainError::BadRequest(format!(
            "{label} card is not active"
        ))),
    }
}
