//! End-to-end scenarios through the wired [`CardLedger`] facade: issue
//! cards, move money, hit the daily limit, then walk the block-request
//! workflow and watch transfers bounce off the blocked card.

use rust_decimal::Decimal;
use uuid::Uuid;

use cardledger::domain::commands::block_requests::{
    ProcessBlockRequestCommand, RequestBlockCommand,
};
use cardledger::domain::commands::cards::CreateCardCommand;
use cardledger::domain::commands::transfers::{EntryListQuery, TransferCommand};
use cardledger::domain::models::{
    AccountHolder, CallerContext, Card, CardStatus, CardType, EntryStatus, Role,
};
use cardledger::storage::traits::AccountHolderStorage;
use cardledger::{CardLedger, CardPolicy, DomainError};

fn register_holder(ledger: &CardLedger, username: &str, roles: Vec<Role>) -> CallerContext {
    let holder = AccountHolder {
        id: Uuid::new_v4(),
        username: username.to_string(),
        full_name: format!("{username} Fullname"),
        email: format!("{username}@example.com"),
        roles,
    };
    ledger.holders.store_holder(&holder).unwrap();
    CallerContext::for_holder(&holder)
}

fn issue_card(
    ledger: &CardLedger,
    caller: &CallerContext,
    balance: Decimal,
    daily_limit: Decimal,
) -> Card {
    ledger
        .card_service
        .create_card(
            caller,
            CreateCardCommand {
                card_type: CardType::Debit,
                holder_name: None,
                daily_limit: Some(daily_limit),
                initial_balance: Some(balance),
            },
        )
        .unwrap()
}

#[test]
fn transfer_moves_money_and_records_a_completed_entry() {
    let ledger = CardLedger::new(CardPolicy::default());
    let alice = register_holder(&ledger, "alice", vec![Role::User]);
    let source = issue_card(&ledger, &alice, Decimal::new(100_00, 2), Decimal::new(150_00, 2));
    let destination = issue_card(&ledger, &alice, Decimal::new(20_00, 2), Decimal::new(150_00, 2));

    let entry = ledger
        .transfer_service
        .transfer(
            &alice,
            TransferCommand {
                source_card_id: source.id,
                destination_card_id: destination.id,
                amount: Decimal::new(50_00, 2),
                description: Some("rent share".to_string()),
            },
        )
        .unwrap();

    assert_eq!(entry.status, EntryStatus::Completed);
    assert_eq!(entry.amount, Decimal::new(50_00, 2));
    assert!(entry.transaction_id.starts_with("TXN-"));
    assert!(entry.reference_number.starts_with("REF-"));
    assert_eq!(entry.balance_before, Some(Decimal::new(100_00, 2)));
    assert_eq!(entry.balance_after, Some(Decimal::new(50_00, 2)));

    let source_view = ledger.query_service.get_card(&alice, source.id).unwrap();
    let destination_view = ledger
        .query_service
        .get_card(&alice, destination.id)
        .unwrap();
    assert_eq!(source_view.balance, Decimal::new(50_00, 2));
    assert_eq!(destination_view.balance, Decimal::new(70_00, 2));
    assert_eq!(
        source_view.balance + destination_view.balance,
        Decimal::new(120_00, 2)
    );
}

#[test]
fn daily_limit_caps_completed_outgoing_volume() {
    let ledger = CardLedger::new(CardPolicy::default());
    let alice = register_holder(&ledger, "alice", vec![Role::User]);
    let source = issue_card(&ledger, &alice, Decimal::new(300_00, 2), Decimal::new(150_00, 2));
    let destination = issue_card(&ledger, &alice, Decimal::ZERO, Decimal::new(150_00, 2));

    ledger
        .transfer_service
        .transfer(
            &alice,
            TransferCommand {
                source_card_id: source.id,
                destination_card_id: destination.id,
                amount: Decimal::new(50_00, 2),
                description: None,
            },
        )
        .unwrap();

    let err = ledger
        .transfer_service
        .transfer(
            &alice,
            TransferCommand {
                source_card_id: source.id,
                destination_card_id: destination.id,
                amount: Decimal::new(120_00, 2),
                description: None,
            },
        )
        .unwrap_err();
    match err {
        DomainError::DailyLimitExceeded { spent, limit } => {
            assert_eq!(spent, Decimal::new(50_00, 2));
            assert_eq!(limit, Decimal::new(150_00, 2));
        }
        other => panic!("expected DailyLimitExceeded, got {other:?}"),
    }

    let details = ledger
        .query_service
        .get_card_details(&alice, source.id)
        .unwrap();
    assert_eq!(details.today_spent, Decimal::new(50_00, 2));
}

#[test]
fn approved_block_request_blocks_the_card_and_stops_transfers() {
    let ledger = CardLedger::new(CardPolicy::default());
    let alice = register_holder(&ledger, "alice", vec![Role::User]);
    let admin = register_holder(&ledger, "admin", vec![Role::Admin]);
    let source = issue_card(&ledger, &alice, Decimal::new(100_00, 2), Decimal::new(150_00, 2));
    let destination = issue_card(&ledger, &alice, Decimal::ZERO, Decimal::new(150_00, 2));

    let request = ledger
        .block_request_service
        .request_block(
            &alice,
            RequestBlockCommand {
                card_id: source.id,
                reason: "card misplaced".to_string(),
            },
        )
        .unwrap();

    ledger
        .block_request_service
        .process_request(
            &admin,
            ProcessBlockRequestCommand {
                request_id: request.id,
                approve: true,
                admin_comment: Some("verified by phone".to_string()),
            },
        )
        .unwrap();

    let view = ledger.query_service.get_card(&alice, source.id).unwrap();
    assert_eq!(view.status, CardStatus::Blocked);
    let details = ledger
        .query_service
        .get_card_details(&alice, source.id)
        .unwrap();
    assert_eq!(details.block_reason.as_deref(), Some("card misplaced"));

    let err = ledger
        .transfer_service
        .transfer(
            &alice,
            TransferCommand {
                source_card_id: source.id,
                destination_card_id: destination.id,
                amount: Decimal::new(10_00, 2),
                description: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::CardBlocked(_)));

    // Second decision on the same request is rejected and changes nothing.
    let err = ledger
        .block_request_service
        .process_request(
            &admin,
            ProcessBlockRequestCommand {
                request_id: request.id,
                approve: false,
                admin_comment: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    let view = ledger.query_service.get_card(&alice, source.id).unwrap();
    assert_eq!(view.status, CardStatus::Blocked);
}

#[test]
fn failed_preconditions_leave_no_ledger_trace() {
    let ledger = CardLedger::new(CardPolicy::default());
    let alice = register_holder(&ledger, "alice", vec![Role::User]);
    let source = issue_card(&ledger, &alice, Decimal::new(5_00, 2), Decimal::new(150_00, 2));
    let destination = issue_card(&ledger, &alice, Decimal::ZERO, Decimal::new(150_00, 2));

    let err = ledger
        .transfer_service
        .transfer(
            &alice,
            TransferCommand {
                source_card_id: source.id,
                destination_card_id: destination.id,
                amount: Decimal::new(10_00, 2),
                description: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::InsufficientFunds(_)));

    let entries = ledger
        .query_service
        .list_own_transactions(&alice, &EntryListQuery::default())
        .unwrap();
    assert!(entries.entries.is_empty());

    let view = ledger.query_service.get_card(&alice, source.id).unwrap();
    assert_eq!(view.balance, Decimal::new(5_00, 2));
}

#[test]
fn admin_unblock_restores_transfers() {
    let ledger = CardLedger::new(CardPolicy::default());
    let alice = register_holder(&ledger, "alice", vec![Role::User]);
    let admin = register_holder(&ledger, "admin", vec![Role::Admin]);
    let source = issue_card(&ledger, &alice, Decimal::new(100_00, 2), Decimal::new(150_00, 2));
    let destination = issue_card(&ledger, &alice, Decimal::ZERO, Decimal::new(150_00, 2));

    ledger
        .card_service
        .block_card(&admin, source.id, "routine review".to_string())
        .unwrap();
    let err = ledger
        .transfer_service
        .transfer(
            &alice,
            TransferCommand {
                source_card_id: source.id,
                destination_card_id: destination.id,
                amount: Decimal::new(10_00, 2),
                description: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::CardBlocked(_)));

    ledger.card_service.unblock_card(&admin, source.id).unwrap();
    ledger
        .transfer_service
        .transfer(
            &alice,
            TransferCommand {
                source_card_id: source.id,
                destination_card_id: destination.id,
                amount: Decimal::new(10_00, 2),
                description: None,
            },
        )
        .unwrap();

    let view = ledger.query_service.get_card(&alice, source.id).unwrap();
    assert_eq!(view.balance, Decimal::new(90_00, 2));
}
