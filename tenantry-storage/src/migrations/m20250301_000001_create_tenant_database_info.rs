use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenantDatabaseInfo::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TenantDatabaseInfo::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(TenantDatabaseInfo::TenantSlug)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TenantDatabaseInfo::CompanyName).string_len(255).not_null())
                    .col(ColumnDef::new(TenantDatabaseInfo::DatabaseName).string_len(100).not_null())
                    .col(ColumnDef::new(TenantDatabaseInfo::DatabaseUser).string_len(100).not_null())
                    .col(ColumnDef::new(TenantDatabaseInfo::DatabasePasswordEncrypted).text().not_null())
                    .col(ColumnDef::new(TenantDatabaseInfo::DatabaseHost).string_len(255).not_null())
                    .col(ColumnDef::new(TenantDatabaseInfo::DatabasePort).integer().not_null())
                    .col(
                        ColumnDef::new(TenantDatabaseInfo::SubscriptionPlan)
                            .string_len(32)
                            .not_null()
                            .default("BASIC"),
                    )
                    .col(
                        ColumnDef::new(TenantDatabaseInfo::Status)
                            .string_len(32)
                            .not_null()
                            .default("PROVISIONING"),
                    )
                    .col(
                        ColumnDef::new(TenantDatabaseInfo::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TenantDatabaseInfo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenantDatabaseInfo::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tenant_database_info_status")
                    .table(TenantDatabaseInfo::Table)
                    .col(TenantDatabaseInfo::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tenant_database_info_is_active")
                    .table(TenantDatabaseInfo::Table)
                    .col(TenantDatabaseInfo::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenantDatabaseInfo::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantDatabaseInfo {
    Table,
    Id,
    TenantSlug,
    CompanyName,
    DatabaseName,
    DatabaseUser,
    DatabasePasswordEncrypted,
    DatabaseHost,
    DatabasePort,
    SubscriptionPlan,
    Status,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
