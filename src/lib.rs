pub mod benchmark;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod queries;
pub mod report;
pub mod schema;
pub mod source;

pub use db::Session;
pub use error::{AppError, AppResult, RowError};
