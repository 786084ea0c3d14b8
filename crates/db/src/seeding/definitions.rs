//! Core types for the seed engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Batch id for seeds: the Unix timestamp (seconds) captured once per
/// apply invocation.
///
/// Deliberately distinct from [`crate::migrations::MigrationBatch`], which
/// is a sequential integer; the two numbering schemes are never unified.
/// Two apply invocations within the same second share a batch value.
pub type SeedBatch = i64;

/// One ledger row: a seeder that has been applied.
///
/// The `filename` column holds the seeder name, for parity with the
/// migration ledger's shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedSeed {
    pub filename: String,
    pub batch: SeedBatch,
    pub seeded_at: NaiveDateTime,
}

/// Configuration for the seed engine.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Directory where seeder skeletons are scaffolded.
    pub seeds_dir: PathBuf,
    /// Ledger table name.
    pub seeds_table: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seeds_dir: PathBuf::from("src/seeds"),
            seeds_table: "seeds".to_string(),
        }
    }
}

/// Result of an apply operation.
#[derive(Debug)]
pub struct SeedReport {
    /// Batch shared by everything seeded in this call; `None` when
    /// nothing was pending.
    pub batch: Option<SeedBatch>,
    /// Seeder names applied, in application order.
    pub seeded: Vec<String>,
    /// Registered seeders that already had a ledger row and were skipped.
    pub skipped: usize,
}

/// Result of a rollback operation.
#[derive(Debug)]
pub struct SeedRollbackReport {
    /// Seeder names whose ledger rows were removed, reverse of
    /// application order.
    pub rolled_back: Vec<String>,
}
