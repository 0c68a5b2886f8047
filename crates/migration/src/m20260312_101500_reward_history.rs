use sea_orm_migration::prelude::*;

use crate::m20260301_090000_accounts::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

// `RewardId` carries no foreign key on purpose: catalog entries may be
// edited or deleted independently of the history that references them.
#[derive(Iden)]
pub enum RewardHistory {
    Table,
    Id,
    AccountId,
    RewardId,
    CostPoints,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RewardHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardHistory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RewardHistory::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RewardHistory::RewardId).string().not_null())
                    .col(
                        ColumnDef::new(RewardHistory::CostPoints)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardHistory::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reward_history-account_id")
                            .from(RewardHistory::Table, RewardHistory::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reward_history-account_id-created_at")
                    .table(RewardHistory::Table)
                    .col(RewardHistory::AccountId)
                    .col(RewardHistory::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RewardHistory::Table).to_owned())
            .await
    }
}
