use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HostingAccount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HostingAccount::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HostingAccount::ServerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HostingAccount::ExternalId).string().null())
                    .col(
                        ColumnDef::new(HostingAccount::CustomerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HostingAccount::CreatedAt).string().not_null())
                    .col(ColumnDef::new(HostingAccount::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hosting_accounts_server")
                    .table(HostingAccount::Table)
                    .col(HostingAccount::ServerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ManagedResource::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ManagedResource::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ManagedResource::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ManagedResource::Kind).string().not_null())
                    .col(ColumnDef::new(ManagedResource::ExternalId).string().null())
                    .col(
                        ColumnDef::new(ManagedResource::IdentityKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ManagedResource::Payload).string().not_null())
                    .col(
                        ColumnDef::new(ManagedResource::SyncStatus)
                            .string()
                            .not_null()
                            .default("local-only"),
                    )
                    .col(
                        ColumnDef::new(ManagedResource::SyncFingerprint)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(ManagedResource::LastSyncedAt).string().null())
                    .col(ColumnDef::new(ManagedResource::CreatedAt).string().not_null())
                    .col(ColumnDef::new(ManagedResource::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // One local record per panel resource; NULL external ids never collide
        manager
            .create_index(
                Index::create()
                    .name("idx_managed_resources_external")
                    .table(ManagedResource::Table)
                    .col(ManagedResource::AccountId)
                    .col(ManagedResource::Kind)
                    .col(ManagedResource::ExternalId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_managed_resources_identity")
                    .table(ManagedResource::Table)
                    .col(ManagedResource::AccountId)
                    .col(ManagedResource::Kind)
                    .col(ManagedResource::IdentityKey)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ManagedResource::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HostingAccount::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum HostingAccount {
    #[sea_orm(iden = "hosting_accounts")]
    Table,
    Id,
    ServerId,
    ExternalId,
    CustomerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ManagedResource {
    #[sea_orm(iden = "managed_resources")]
    Table,
    Id,
    AccountId,
    Kind,
    ExternalId,
    IdentityKey,
    Payload,
    SyncStatus,
    SyncFingerprint,
    LastSyncedAt,
    CreatedAt,
    UpdatedAt,
}
