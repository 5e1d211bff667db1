use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerConfigs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServerConfigs::Key)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerConfigs::Value)
                            .string_len(2048)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServerConfigs::Comment).string_len(1024))
                    .col(ColumnDef::new(ServerConfigs::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(ServerConfigs::LastModifiedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerConfigs::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerConfigs::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .index(
                        Index::create()
                            .name("idx_server_configs_key")
                            .table(ServerConfigs::Table)
                            .col(ServerConfigs::Key)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerConfigs::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum ServerConfigs {
    Table,
    Id,
    Key,
    Value,
    Comment,
    CreatedBy,
    LastModifiedBy,
    CreatedAt,
    UpdatedAt,
}
