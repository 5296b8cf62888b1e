use brixa::domain::{Address, Decimal, TransactionKind};
use brixa::ledger::{AccountService, LedgerError};
use brixa::store::{Ledger, MemoryKvStore};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

fn service() -> AccountService {
    let store = Arc::new(MemoryKvStore::new());
    AccountService::new(Arc::new(Ledger::new(store)), Duration::ZERO)
}

fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_purchase_credits_balance_and_logs() {
    let svc = service();
    let a = addr("0xABC");

    let receipt = svc.purchase(&a, dec("100")).await.unwrap();
    assert_eq!(receipt.new_balance, dec("100"));
    assert!(!receipt.transaction_id.is_empty());

    assert_eq!(svc.balance_of(&a).await.unwrap(), dec("100"));

    let history = svc.history(&a).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransactionKind::Purchase);
    assert_eq!(history[0].amount, dec("100"));
}

#[tokio::test]
async fn test_purchase_rejects_non_positive_amount() {
    let svc = service();
    let a = addr("0xABC");

    for amount in ["0", "-5"] {
        match svc.purchase(&a, dec(amount)).await {
            Err(LedgerError::InvalidArgument(_)) => {}
            other => panic!("expected InvalidArgument for {}, got {:?}", amount, other),
        }
    }

    // No mutation on rejection.
    assert_eq!(svc.balance_of(&a).await.unwrap(), Decimal::zero());
    assert!(svc.history(&a).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_address_is_unrepresentable() {
    assert!(Address::from_str("").is_err());
    assert!(Address::from_str("  ").is_err());
}

#[tokio::test]
async fn test_balance_of_unknown_address_is_zero() {
    let svc = service();
    assert_eq!(
        svc.balance_of(&addr("0xNEVER")).await.unwrap(),
        Decimal::zero()
    );
}

#[tokio::test]
async fn test_transfer_debits_and_logs_investment_kind() {
    let svc = service();
    let a = addr("0xABC");
    svc.purchase(&a, dec("100")).await.unwrap();

    let receipt = svc.transfer(&a, dec("60"), None, None).await.unwrap();
    assert!(!receipt.transaction_id.is_empty());
    assert_eq!(svc.balance_of(&a).await.unwrap(), dec("40"));

    let history = svc.history(&a).await.unwrap();
    assert_eq!(history[0].kind, TransactionKind::Investment);
    assert_eq!(history[0].amount, dec("60"));
}

#[tokio::test]
async fn test_transfer_insufficient_balance_leaves_state_unchanged() {
    let svc = service();
    let a = addr("0xABC");
    svc.purchase(&a, dec("30")).await.unwrap();

    match svc.transfer(&a, dec("31"), None, None).await {
        Err(LedgerError::InsufficientBalance {
            requested,
            available,
        }) => {
            assert_eq!(requested, dec("31"));
            assert_eq!(available, dec("30"));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }

    assert_eq!(svc.balance_of(&a).await.unwrap(), dec("30"));
    assert_eq!(svc.history(&a).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_transfer_on_empty_account_fails_balance_stays_zero() {
    let svc = service();
    let a = addr("0xDEF");

    match svc.transfer(&a, dec("50"), None, None).await {
        Err(LedgerError::InsufficientBalance { available, .. }) => {
            assert_eq!(available, Decimal::zero());
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }
    assert_eq!(svc.balance_of(&a).await.unwrap(), Decimal::zero());
}

#[tokio::test]
async fn test_history_is_most_recent_first() {
    let svc = service();
    let a = addr("0xABC");

    svc.purchase(&a, dec("10")).await.unwrap();
    svc.purchase(&a, dec("20")).await.unwrap();
    svc.transfer(&a, dec("5"), None, None).await.unwrap();

    let history = svc.history(&a).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, TransactionKind::Investment);
    assert_eq!(history[1].amount, dec("20"));
    assert_eq!(history[2].amount, dec("10"));
}

#[tokio::test]
async fn test_balance_never_negative_across_sequences() {
    let svc = service();
    let a = addr("0xABC");

    svc.purchase(&a, dec("25")).await.unwrap();
    let _ = svc.transfer(&a, dec("10"), None, None).await;
    let _ = svc.transfer(&a, dec("100"), None, None).await; // rejected
    let _ = svc.transfer(&a, dec("15"), None, None).await;
    let _ = svc.transfer(&a, dec("1"), None, None).await; // rejected, empty now

    let balance = svc.balance_of(&a).await.unwrap();
    assert!(!balance.is_negative());
    assert_eq!(balance, Decimal::zero());
}

#[tokio::test]
async fn test_accounts_are_isolated_per_address() {
    let svc = service();
    svc.purchase(&addr("0xAAA"), dec("100")).await.unwrap();

    assert_eq!(
        svc.balance_of(&addr("0xBBB")).await.unwrap(),
        Decimal::zero()
    );
    assert!(svc.history(&addr("0xBBB")).await.unwrap().is_empty());
}
