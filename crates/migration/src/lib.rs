pub use sea_orm_migration::prelude::*;

mod m20260301_090000_accounts;
mod m20260301_094500_transactions;
mod m20260312_100000_rewards;
mod m20260312_101500_reward_history;
mod m20260330_080000_notifications;
mod m20260405_090000_idempotency_key;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_090000_accounts::Migration),
            Box::new(m20260301_094500_transactions::Migration),
            Box::new(m20260312_100000_rewards::Migration),
            Box::new(m20260312_101500_reward_history::Migration),
            Box::new(m20260330_080000_notifications::Migration),
            Box::new(m20260405_090000_idempotency_key::Migration),
        ]
    }
}
