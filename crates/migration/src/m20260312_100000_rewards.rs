use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Rewards {
    Table,
    Id,
    Name,
    Kind,
    Value,
    Probability,
    Color,
    IsActive,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rewards::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rewards::Name).string().not_null())
                    .col(ColumnDef::new(Rewards::Kind).string().not_null())
                    .col(ColumnDef::new(Rewards::Value).big_integer().not_null())
                    .col(ColumnDef::new(Rewards::Probability).double().not_null())
                    .col(ColumnDef::new(Rewards::Color).string().not_null())
                    .col(
                        ColumnDef::new(Rewards::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Rewards::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rewards::Table).to_owned())
            .await
    }
}
