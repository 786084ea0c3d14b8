//! Seed Engine
//!
//! Procedural data-loading routines from a static registry, applied in
//! alphabetical name order and recorded in a Unix-timestamp-batch ledger.
//! Mirrors the migration engine's apply/rollback/idempotency shape with
//! routines instead of parsed SQL.

pub mod definitions;
pub(crate) mod ledger;
pub mod registry;
pub mod runner;

pub use definitions::*;
pub use registry::{SeedRegistry, Seeder};
pub use runner::SeedRunner;
