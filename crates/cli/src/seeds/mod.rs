//! Application seeders.
//!
//! The registry is the source of truth for which seeders exist; it is
//! built once at process start and handed to the seed engine. Scaffolded
//! seeder modules (`make-seeder`) register here.

mod users;

use loam_db::{SeedRegistry, Seeder};

/// Build the static seed registry.
pub fn registry() -> SeedRegistry {
    SeedRegistry::new()
        .add(Seeder::new("UserSeeder", users::run).with_rollback(users::rollback))
}
