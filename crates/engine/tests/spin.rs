use sea_orm::{Database, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use engine::{
    Engine, EngineError, PointsChange, RewardKind, RewardUpsertCmd, TransactionKind,
    reward_history,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .spin_cost(100)
        .build()
        .unwrap();
    (engine, db)
}

async fn account_with_points(engine: &Engine, points: i64) -> Uuid {
    let account_id = engine
        .create_account("alice", "password")
        .await
        .unwrap()
        .id;
    if points > 0 {
        engine
            .credit_points(PointsChange::new(
                account_id,
                points,
                TransactionKind::PointsEarned,
            ))
            .await
            .unwrap();
    }
    account_id
}

async fn seed_reward(engine: &Engine, name: &str, kind: RewardKind, value: i64, probability: f64) {
    engine
        .upsert_reward(RewardUpsertCmd {
            id: None,
            name: name.to_string(),
            kind,
            value,
            probability,
            color: "#336699".to_string(),
            is_active: true,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn spin_pays_cost_and_credits_points_reward() {
    let (engine, db) = engine_with_db().await;
    let account_id = account_with_points(&engine, 250).await;
    seed_reward(&engine, "Points50", RewardKind::Points, 50, 1.0).await;

    let outcome = engine.spin(account_id).await.unwrap();

    assert_eq!(outcome.reward.name, "Points50");
    assert_eq!(outcome.points, 200); // 250 - 100 + 50
    assert_eq!(outcome.balance_minor, 0);

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.points, 200);

    let history = reward_history::Entity::find().all(&db).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].cost_points, 100);
    assert_eq!(history[0].account_id, account_id.to_string());

    // Cost and payout both leave audit records.
    let (records, _) = engine.list_transactions(account_id, 50, None).await.unwrap();
    assert!(records.iter().any(|tx| {
        tx.kind == TransactionKind::PointsRedeemed && tx.points == -100
    }));
    assert!(records.iter().any(|tx| {
        tx.kind == TransactionKind::PointsEarned && tx.points == 50
    }));
}

#[tokio::test]
async fn spin_credits_balance_rewards_to_the_balance() {
    let (engine, _db) = engine_with_db().await;
    let account_id = account_with_points(&engine, 100).await;
    seed_reward(&engine, "Cash", RewardKind::Balance, 500, 1.0).await;

    let outcome = engine.spin(account_id).await.unwrap();

    assert_eq!(outcome.reward.name, "Cash");
    assert_eq!(outcome.points, 0);
    assert_eq!(outcome.balance_minor, 500);
}

#[tokio::test]
async fn spin_without_enough_points_fails_before_catalog_work() {
    let (engine, db) = engine_with_db().await;
    let account_id = account_with_points(&engine, 50).await;
    seed_reward(&engine, "Points50", RewardKind::Points, 50, 1.0).await;

    let err = engine.spin(account_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.points, 50);

    let history = reward_history::Entity::find().all(&db).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn spin_against_empty_catalog_rolls_back_the_cost() {
    let (engine, db) = engine_with_db().await;
    let account_id = account_with_points(&engine, 250).await;

    let err = engine.spin(account_id).await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveRewards);

    // The cost debit rolled back with the transaction: no points lost, no
    // cost record left behind.
    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.points, 250);

    let (records, _) = engine.list_transactions(account_id, 50, None).await.unwrap();
    assert!(
        records
            .iter()
            .all(|tx| tx.kind != TransactionKind::PointsRedeemed)
    );
    let history = reward_history::Entity::find().all(&db).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn inactive_rewards_never_win() {
    let (engine, _db) = engine_with_db().await;
    let account_id = account_with_points(&engine, 250).await;

    engine
        .upsert_reward(RewardUpsertCmd {
            id: None,
            name: "Retired".to_string(),
            kind: RewardKind::Points,
            value: 50,
            probability: 1.0,
            color: "#336699".to_string(),
            is_active: false,
        })
        .await
        .unwrap();

    let err = engine.spin(account_id).await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveRewards);
}

#[tokio::test]
async fn partial_probability_totals_still_always_produce_a_winner() {
    let (engine, _db) = engine_with_db().await;
    let account_id = account_with_points(&engine, 1000).await;
    // Active weights sum to 0.4, not 1.
    seed_reward(&engine, "A", RewardKind::Points, 10, 0.3).await;
    seed_reward(&engine, "B", RewardKind::Points, 10, 0.1).await;

    for _ in 0..5 {
        let outcome = engine.spin(account_id).await.unwrap();
        assert!(outcome.reward.name == "A" || outcome.reward.name == "B");
    }
}

#[tokio::test]
async fn catalog_upsert_validates_admin_input() {
    let (engine, _db) = engine_with_db().await;

    let invalid = [
        RewardUpsertCmd {
            id: None,
            name: "Prize".to_string(),
            kind: RewardKind::Points,
            value: 10,
            probability: 1.2,
            color: "#336699".to_string(),
            is_active: true,
        },
        RewardUpsertCmd {
            id: None,
            name: "   ".to_string(),
            kind: RewardKind::Points,
            value: 10,
            probability: 0.5,
            color: "#336699".to_string(),
            is_active: true,
        },
        RewardUpsertCmd {
            id: None,
            name: "Prize".to_string(),
            kind: RewardKind::Points,
            value: -1,
            probability: 0.5,
            color: "#336699".to_string(),
            is_active: true,
        },
        RewardUpsertCmd {
            id: None,
            name: "Prize".to_string(),
            kind: RewardKind::Points,
            value: 10,
            probability: 0.5,
            color: "blue".to_string(),
            is_active: true,
        },
    ];

    for cmd in invalid {
        let err = engine.upsert_reward(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn deleting_a_reward_keeps_existing_history() {
    let (engine, db) = engine_with_db().await;
    let account_id = account_with_points(&engine, 250).await;
    seed_reward(&engine, "Points50", RewardKind::Points, 50, 1.0).await;

    let outcome = engine.spin(account_id).await.unwrap();
    engine.delete_reward(outcome.reward.id).await.unwrap();

    // History rows reference the catalog, they do not own it.
    let history = reward_history::Entity::find().all(&db).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reward_id, outcome.reward.id.to_string());

    assert!(engine.list_active_rewards().await.unwrap().is_empty());
}
