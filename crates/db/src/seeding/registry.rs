//! Seed registry - the static table of named seed routines.
//!
//! A seeder pairs a forward routine with an optional backward routine,
//! both async closures over the pool. The registry is built once at
//! process start and looked up by name; ledger rows reference entries by
//! name only, so lookups may miss and callers must tolerate that.

use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;

use crate::error::DbResult;

type SeedFuture = Pin<Box<dyn Future<Output = DbResult<()>> + Send>>;
type SeedRoutine = Box<dyn Fn(PgPool) -> SeedFuture + Send + Sync>;

/// A named seed unit: a forward routine and an optional backward routine.
pub struct Seeder {
    name: String,
    run: SeedRoutine,
    rollback: Option<SeedRoutine>,
}

impl Seeder {
    /// Create a seeder from a forward routine.
    ///
    /// The pool is passed by value; `PgPool` is a cheap handle, so plain
    /// `async fn(PgPool) -> DbResult<()>` functions register directly.
    pub fn new<F, Fut>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(PgPool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DbResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(move |pool| Box::pin(run(pool))),
            rollback: None,
        }
    }

    /// Attach a backward routine.
    pub fn with_rollback<F, Fut>(mut self, rollback: F) -> Self
    where
        F: Fn(PgPool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DbResult<()>> + Send + 'static,
    {
        self.rollback = Some(Box::new(move |pool| Box::pin(rollback(pool))));
        self
    }

    /// Get the seeder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a backward routine is registered.
    pub fn has_rollback(&self) -> bool {
        self.rollback.is_some()
    }

    /// Invoke the forward routine.
    pub async fn run(&self, pool: PgPool) -> DbResult<()> {
        (self.run)(pool).await
    }

    /// Invoke the backward routine; a seeder without one does nothing.
    pub async fn rollback(&self, pool: PgPool) -> DbResult<()> {
        match &self.rollback {
            Some(rollback) => rollback(pool).await,
            None => Ok(()),
        }
    }
}

/// Ordered collection of seeders, looked up by name.
#[derive(Default)]
pub struct SeedRegistry {
    seeders: Vec<Seeder>,
}

impl SeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a seeder.
    pub fn add(mut self, seeder: Seeder) -> Self {
        self.seeders.push(seeder);
        self
    }

    /// Look up a seeder by name.
    pub fn get(&self, name: &str) -> Option<&Seeder> {
        self.seeders.iter().find(|s| s.name() == name)
    }

    /// Iterate seeders in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Seeder> {
        self.seeders.iter()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.seeders.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.seeders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/loam_test").unwrap()
    }

    #[test]
    fn registry_preserves_registration_order_and_lookups() {
        let registry = SeedRegistry::new()
            .add(Seeder::new("UserSeeder", |_pool| async { Ok(()) }))
            .add(Seeder::new("ProductSeeder", |_pool| async { Ok(()) }));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["UserSeeder", "ProductSeeder"]);
        assert!(registry.get("UserSeeder").is_some());
        assert!(registry.get("MissingSeeder").is_none());
    }

    #[tokio::test]
    async fn run_invokes_the_forward_routine() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let seeder = Seeder::new("CountSeeder", move |_pool| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        seeder.run(lazy_pool()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rollback_without_routine_is_a_no_op() {
        let seeder = Seeder::new("ForwardOnly", |_pool| async { Ok(()) });
        assert!(!seeder.has_rollback());
        seeder.rollback(lazy_pool()).await.unwrap();
    }

    #[tokio::test]
    async fn rollback_invokes_the_backward_routine() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let seeder = Seeder::new("Reversible", |_pool| async { Ok(()) }).with_rollback(
            move |_pool| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        assert!(seeder.has_rollback());
        seeder.rollback(lazy_pool()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
