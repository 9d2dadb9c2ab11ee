use migration::{CreateMovieSchema, MigrationTrait, TABLES};
use sea_orm_migration::SchemaManager;
use tracing::{debug, info};

use crate::{db::Session, error::AppResult};

/// Creates the nine movie tables if they are absent and turns on foreign-key
/// enforcement. Existing tables and their rows are left untouched, and rows
/// already stored are not re-checked against the constraints.
pub async fn ensure_schema(session: &Session) -> AppResult<()> {
    session.enable_foreign_keys().await?;

    let manager = SchemaManager::new(session.db());
    CreateMovieSchema.up(&manager).await?;

    info!(tables = TABLES.len(), "schema ensured");
    Ok(())
}

/// The subset of the nine schema tables currently present, in import order.
pub async fn existing_tables(session: &Session) -> AppResult<Vec<&'static str>> {
    let manager = SchemaManager::new(session.db());
    let mut present = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        if manager.has_table(table).await? {
            present.push(table);
        } else {
            debug!(table, "table missing");
        }
    }
    Ok(present)
}
