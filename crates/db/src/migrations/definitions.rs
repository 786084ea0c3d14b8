//! Core types for the migration engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Batch id for migrations: a sequential integer, computed as
/// `max(existing batch) + 1` when an apply operation begins. Every unit
/// applied in one invocation shares one batch number.
///
/// Deliberately distinct from [`crate::seeding::SeedBatch`], which is a
/// Unix timestamp; the two numbering schemes are never unified.
pub type MigrationBatch = i32;

/// A parsed migration script.
///
/// Immutable once parsed. Only the `filename` is persisted, via a ledger
/// row written after execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationScript {
    /// File stem, convention `<14-digit-timestamp>_<name>`, no extension.
    pub filename: String,
    /// Forward statements in source order.
    pub forward: Vec<String>,
    /// Backward statements in source order; empty when the script has no
    /// backward section.
    pub backward: Vec<String>,
}

/// One ledger row: a migration that has been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedMigration {
    pub filename: String,
    pub batch: MigrationBatch,
    pub applied_at: NaiveDateTime,
}

/// Configuration for the migration engine.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Directory where migration scripts are stored.
    pub migrations_dir: PathBuf,
    /// Ledger table name.
    pub migrations_table: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("migrations"),
            migrations_table: "migrations".to_string(),
        }
    }
}

/// Result of an apply operation.
#[derive(Debug)]
pub struct ApplyReport {
    /// Batch shared by everything applied in this call; `None` when
    /// nothing was pending.
    pub batch: Option<MigrationBatch>,
    /// Filenames applied, in application order.
    pub applied: Vec<String>,
    /// Known scripts that already had a ledger row and were skipped.
    pub skipped: usize,
}

/// Result of a rollback operation.
#[derive(Debug)]
pub struct RollbackReport {
    /// Filenames rolled back, reverse of application order.
    pub rolled_back: Vec<String>,
}
