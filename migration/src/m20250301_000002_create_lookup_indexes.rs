use sea_orm_migration::prelude::*;

use crate::LOOKUP_INDEXES;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for index in LOOKUP_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(index.name)
                        .table(Alias::new(index.table))
                        .col(Alias::new(index.column))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for index in LOOKUP_INDEXES {
            manager
                .drop_index(
                    Index::drop()
                        .name(index.name)
                        .table(Alias::new(index.table))
                        .if_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
