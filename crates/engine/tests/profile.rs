use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{BalanceChange, Engine, EngineError, TopupCmd, TransactionKind, TransactionStatus};
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
async fn fresh_account_profile_tolerates_missing_data() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let snapshot = engine.profile(account_id).await.unwrap();
    assert_eq!(snapshot.balance_minor, 0);
    assert_eq!(snapshot.points, 0);
    assert_eq!(snapshot.orders_count, 0);
    assert_eq!(snapshot.total_spent_minor, 0);
    assert_eq!(snapshot.unread_notifications, 0);
    assert_eq!(snapshot.avatar, None);
}

#[tokio::test]
async fn profile_of_missing_account_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.profile(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn mutations_invalidate_the_cached_snapshot() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    // Prime the cache with the zero-balance snapshot; its TTL is still
    // fresh when the credit lands.
    let before = engine.profile(account_id).await.unwrap();
    assert_eq!(before.balance_minor, 0);

    engine
        .credit(BalanceChange::new(
            account_id,
            1000,
            TransactionKind::Bonus,
        ))
        .await
        .unwrap();

    let after = engine.profile(account_id).await.unwrap();
    assert_eq!(after.balance_minor, 1000);
}

#[tokio::test]
async fn completed_purchases_feed_the_order_aggregates() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    engine
        .credit(BalanceChange::new(
            account_id,
            1000,
            TransactionKind::Bonus,
        ))
        .await
        .unwrap();
    engine
        .debit(BalanceChange::new(
            account_id,
            300,
            TransactionKind::Purchase,
        ))
        .await
        .unwrap();
    engine
        .debit(BalanceChange::new(
            account_id,
            250,
            TransactionKind::Purchase,
        ))
        .await
        .unwrap();

    let snapshot = engine.profile(account_id).await.unwrap();
    assert_eq!(snapshot.balance_minor, 450);
    assert_eq!(snapshot.orders_count, 2);
    assert_eq!(snapshot.total_spent_minor, 550);
}

#[tokio::test]
async fn avatar_update_shows_up_on_the_next_read() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    engine.profile(account_id).await.unwrap();
    engine
        .update_avatar(account_id, Some("avatars/alice.png".to_string()))
        .await
        .unwrap();

    let snapshot = engine.profile(account_id).await.unwrap();
    assert_eq!(snapshot.avatar, Some("avatars/alice.png".to_string()));
}

#[tokio::test]
async fn topup_settlement_credits_amount_plus_bonus_exactly_once() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let topup = engine
        .record_topup(
            TopupCmd::new(account_id, 1000)
                .bonus_minor(100)
                .payment_method("card")
                .payment_ref("psp-42"),
        )
        .await
        .unwrap();
    assert_eq!(topup.status, TransactionStatus::Pending);

    // Nothing lands until the payment collaborator settles.
    assert_eq!(engine.account(account_id).await.unwrap().balance_minor, 0);

    let settled = engine
        .settle_topup(topup.id, TransactionStatus::Completed)
        .await
        .unwrap();
    assert_eq!(settled.status, TransactionStatus::Completed);
    assert_eq!(engine.account(account_id).await.unwrap().balance_minor, 1100);

    // Terminal records never transition again.
    let err = engine
        .settle_topup(topup.id, TransactionStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert_eq!(engine.account(account_id).await.unwrap().balance_minor, 1100);

    let snapshot = engine.profile(account_id).await.unwrap();
    assert_eq!(snapshot.unread_notifications, 1);
}

#[tokio::test]
async fn cancelled_topup_never_credits() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let topup = engine
        .record_topup(TopupCmd::new(account_id, 1000))
        .await
        .unwrap();
    let settled = engine
        .settle_topup(topup.id, TransactionStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(settled.status, TransactionStatus::Cancelled);
    assert_eq!(engine.account(account_id).await.unwrap().balance_minor, 0);
}

#[tokio::test]
async fn settling_to_pending_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let topup = engine
        .record_topup(TopupCmd::new(account_id, 1000))
        .await
        .unwrap();
    let err = engine
        .settle_topup(topup.id, TransactionStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn keyed_topup_is_recorded_once() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine).await;

    let first = engine
        .record_topup(TopupCmd::new(account_id, 1000).idempotency_key("req-7"))
        .await
        .unwrap();
    let replay = engine
        .record_topup(TopupCmd::new(account_id, 1000).idempotency_key("req-7"))
        .await
        .unwrap();

    assert_eq!(first.id, replay.id);

    let (records, _) = engine.list_transactions(account_id, 50, None).await.unwrap();
    assert_eq!(records.len(), 1);
}
