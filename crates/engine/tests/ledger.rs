use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{BalanceChange, Engine, EngineError, PointsChange, TransactionKind};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().unwrap();
    (engine, db)
}

async fn new_account(engine: &Engine) -> Uuid {
    engine
        .create_account("alice", "password")
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn credit_then_debit_round_trips() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let balance = engine
        .credit(BalanceChange::new(
            account_id,
            1000,
            TransactionKind::Bonus,
        ))
        .await
        .unwrap();
    assert_eq!(balance, 1000);

    let balance = engine
        .debit(BalanceChange::new(
            account_id,
            1000,
            TransactionKind::Purchase,
        ))
        .await
        .unwrap();
    assert_eq!(balance, 0);
}

#[tokio::test]
async fn debit_beyond_balance_fails_and_leaves_balance_untouched() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    engine
        .credit(BalanceChange::new(account_id, 100, TransactionKind::Bonus))
        .await
        .unwrap();

    let err = engine
        .debit(BalanceChange::new(
            account_id,
            150,
            TransactionKind::Purchase,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 100);
}

#[tokio::test]
async fn two_debits_of_sixty_against_one_hundred_yield_one_success() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    engine
        .credit(BalanceChange::new(account_id, 100, TransactionKind::Bonus))
        .await
        .unwrap();

    let first = engine
        .debit(BalanceChange::new(
            account_id,
            60,
            TransactionKind::Purchase,
        ))
        .await;
    let second = engine
        .debit(BalanceChange::new(
            account_id,
            60,
            TransactionKind::Purchase,
        ))
        .await;

    assert_eq!(first.unwrap(), 40);
    assert!(matches!(
        second.unwrap_err(),
        EngineError::InsufficientFunds(_)
    ));

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 40);
}

#[tokio::test]
async fn debit_of_missing_account_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .debit(BalanceChange::new(
            Uuid::new_v4(),
            10,
            TransactionKind::Purchase,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    for amount in [0, -5] {
        let err = engine
            .credit(BalanceChange::new(
                account_id,
                amount,
                TransactionKind::Bonus,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn points_ops_mirror_the_balance_contract() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let points = engine
        .credit_points(PointsChange::new(
            account_id,
            50,
            TransactionKind::PointsEarned,
        ))
        .await
        .unwrap();
    assert_eq!(points, 50);

    let points = engine
        .debit_points(PointsChange::new(
            account_id,
            30,
            TransactionKind::PointsRedeemed,
        ))
        .await
        .unwrap();
    assert_eq!(points, 20);

    let err = engine
        .debit_points(PointsChange::new(
            account_id,
            30,
            TransactionKind::PointsRedeemed,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.points, 20);
    assert_eq!(account.balance_minor, 0);
}

#[tokio::test]
async fn keyed_credit_applies_once() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let cmd = BalanceChange::new(account_id, 1000, TransactionKind::Topup)
        .idempotency_key("topup-req-1");

    let first = engine.credit(cmd.clone()).await.unwrap();
    let replay = engine.credit(cmd).await.unwrap();

    assert_eq!(first, 1000);
    assert_eq!(replay, 1000);

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 1000);

    let (records, _) = engine.list_transactions(account_id, 50, None).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn history_pages_newest_first_without_duplicates() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    for amount in [100, 200, 300] {
        engine
            .credit(BalanceChange::new(
                account_id,
                amount,
                TransactionKind::Bonus,
            ))
            .await
            .unwrap();
        // Keep created_at strictly increasing so the order is observable.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let (first_page, cursor) = engine.list_transactions(account_id, 2, None).await.unwrap();
    assert_eq!(
        first_page
            .iter()
            .map(|tx| tx.amount_minor)
            .collect::<Vec<_>>(),
        vec![300, 200]
    );
    let cursor = cursor.expect("a third record remains");

    let (second_page, end) = engine
        .list_transactions(account_id, 2, Some(cursor.as_str()))
        .await
        .unwrap();
    assert_eq!(
        second_page
            .iter()
            .map(|tx| tx.amount_minor)
            .collect::<Vec<_>>(),
        vec![100]
    );
    assert!(end.is_none());
}

#[tokio::test]
async fn garbage_cursor_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let err = engine
        .list_transactions(account_id, 10, Some("not-a-cursor"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCursor(_)));
}
