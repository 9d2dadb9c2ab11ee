use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use tracing::debug;

use crate::error::{AppError, AppResult};

const PRAGMAS: [&str; 3] =
    ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA cache_size=-64000"];

/// The one connection every schema, import, query and benchmark call runs on.
pub struct Session {
    db: DatabaseConnection,
}

impl Session {
    pub async fn open(database_url: &str) -> AppResult<Self> {
        let connection_error =
            |source: DbErr| AppError::Connection { url: database_url.to_string(), source };

        let mut options = ConnectOptions::new(database_url.to_string());
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(options).await.map_err(connection_error)?;
        let session = Self { db };

        for pragma in PRAGMAS {
            session.pragma(pragma).await.map_err(connection_error)?;
        }
        session.enable_foreign_keys().await.map_err(connection_error)?;

        debug!(url = %database_url, "storage opened");
        Ok(session)
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub(crate) async fn enable_foreign_keys(&self) -> Result<(), DbErr> {
        self.pragma("PRAGMA foreign_keys = ON").await
    }

    pub async fn foreign_keys_enabled(&self) -> AppResult<bool> {
        let row = self
            .db
            .query_one(Statement::from_string(
                self.db.get_database_backend(),
                "PRAGMA foreign_keys".to_string(),
            ))
            .await?;
        let enabled = match row {
            Some(row) => row.try_get_by_index::<i32>(0)? == 1,
            None => false,
        };
        Ok(enabled)
    }

    pub async fn close(self) -> AppResult<()> {
        self.db.close().await?;
        Ok(())
    }

    async fn pragma(&self, sql: &str) -> Result<(), DbErr> {
        self.db
            .execute(Statement::from_string(self.db.get_database_backend(), sql.to_string()))
            .await?;
        Ok(())
    }
}
