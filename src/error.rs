use std::path::PathBuf;

use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("cannot open storage at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: DbErr,
    },

    #[error("import of {table} rolled back: {source}")]
    Transaction {
        table: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("cannot read row source {}: {message}", path.display())]
    Source { path: PathBuf, message: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Why a single import row was skipped. Counted, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("malformed row: {0}")]
    Malformed(String),

    #[error("column {column}: cannot read {value:?} as {expected}")]
    Type {
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("rejected by storage: {0}")]
    Rejected(String),
}
