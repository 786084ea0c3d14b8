//! # loam-db: ledger-tracked database evolution
//!
//! Two parallel batch-apply engines keep a live database evolvable and
//! reversible. The migration engine applies raw SQL scripts from a
//! filesystem store and groups them into sequential integer batches; the
//! seed engine runs procedural data-loading routines from a static registry
//! and groups them into Unix-timestamp batches. Both record every applied
//! unit in an append-only ledger table, which is the ground truth of what
//! has been applied and the unit of rollback granularity.
//!
//! Engines receive their `sqlx::PgPool` by construction; there is no global
//! connection state.

pub mod error;
pub mod migrations;
pub mod seeding;

// Re-export core types
pub use error::{DbError, DbResult};
pub use migrations::{
    parse_script, split_statements, AppliedMigration, ApplyReport, MigrationBatch,
    MigrationConfig, MigrationRollback, MigrationRunner, MigrationScript, RollbackReport,
    ScriptStore, DOWN_MARKER, UP_MARKER,
};
pub use seeding::{
    AppliedSeed, SeedBatch, SeedConfig, SeedRegistry, SeedReport, SeedRollbackReport, SeedRunner,
    Seeder,
};
