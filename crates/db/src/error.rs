//! Error types for the migration and seed engines.
//!
//! Every engine operation surfaces a single terminal error; there is no
//! partial-result reporting. Ledger rows record what succeeded before a
//! failure.

use thiserror::Error;

/// Result alias used across both engines.
pub type DbResult<T> = Result<T, DbError>;

/// Error kinds for engine operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// The ledger table could not be created, read, or written.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// A migration script could not be found, read, or re-applied.
    #[error("migration script '{name}': {message}")]
    Script { name: String, message: String },

    /// A forward or backward statement failed to execute.
    #[error("statement failed in '{name}': {message}")]
    Statement { name: String, message: String },

    /// A seed routine failed.
    #[error("seeder '{name}': {message}")]
    Seeder { name: String, message: String },

    /// The database connection could not be established.
    #[error("connection error: {0}")]
    Connection(String),

    /// A query outside the engines' own SQL failed, typically inside a
    /// seed routine.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
