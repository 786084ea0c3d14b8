//! Seed runner - applies registered seeders against the database.

use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashSet;

use super::definitions::{AppliedSeed, SeedBatch, SeedConfig, SeedReport, SeedRollbackReport};
use super::ledger;
use super::registry::SeedRegistry;
use crate::error::{DbError, DbResult};

/// Applies seed routines and records them in the ledger.
pub struct SeedRunner {
    registry: SeedRegistry,
    config: SeedConfig,
    pool: PgPool,
}

impl SeedRunner {
    /// Create a runner over an existing pool with the default
    /// configuration.
    pub fn new(registry: SeedRegistry, pool: PgPool) -> Self {
        Self::with_config(registry, SeedConfig::default(), pool)
    }

    /// Create a runner with a custom configuration.
    pub fn with_config(registry: SeedRegistry, config: SeedConfig, pool: PgPool) -> Self {
        Self {
            registry,
            config,
            pool,
        }
    }

    /// Connect to `database_url` and build a runner over the new pool.
    pub async fn from_url(registry: SeedRegistry, database_url: &str) -> DbResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| DbError::Connection(format!("failed to connect to database: {}", e)))?;
        Ok(Self::new(registry, pool))
    }

    /// Get the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the registry.
    pub fn registry(&self) -> &SeedRegistry {
        &self.registry
    }

    /// Get the configuration.
    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Idempotently create the ledger table.
    pub async fn ensure_ledger(&self) -> DbResult<()> {
        sqlx::query(&ledger::create_table_sql(self.table()))
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to create seed ledger table: {}", e)))?;
        Ok(())
    }

    /// Run every pending seeder in alphabetical name order.
    ///
    /// The batch value, the current Unix timestamp, is captured once per
    /// invocation; every seeder applied in this call shares it.
    pub async fn apply_pending_all(&self) -> DbResult<SeedReport> {
        self.ensure_ledger().await?;

        let batch: SeedBatch = Utc::now().timestamp();
        let applied = self.applied_names().await?;
        let pending = pending_seeders(self.registry.names(), &applied);

        if pending.is_empty() {
            tracing::info!("no pending seeders");
            return Ok(SeedReport {
                batch: None,
                seeded: Vec::new(),
                skipped: applied.len(),
            });
        }

        for name in &pending {
            // Pending names come from the registry, so the lookup holds.
            let seeder = self.registry.get(name).ok_or_else(|| DbError::Seeder {
                name: name.clone(),
                message: "not registered".to_string(),
            })?;

            tracing::info!(seeder = %name, batch, "seeding");
            seeder
                .run(self.pool.clone())
                .await
                .map_err(|e| match e {
                    err @ DbError::Seeder { .. } => err,
                    other => DbError::Seeder {
                        name: name.clone(),
                        message: other.to_string(),
                    },
                })?;

            sqlx::query(&ledger::record_sql(self.table()))
                .bind(name)
                .bind(batch)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::Ledger(format!("failed to record {}: {}", name, e)))?;
        }

        tracing::info!(batch, count = pending.len(), "seed batch applied");
        Ok(SeedReport {
            batch: Some(batch),
            seeded: pending,
            skipped: applied.len(),
        })
    }

    /// Roll back every seeder in `batch`, reverse of application order.
    ///
    /// The ledger row is deleted even when the registry entry is gone or
    /// has no backward routine; those cases are logged loudly so the
    /// operator knows data may remain.
    pub async fn rollback_batch(&self, batch: SeedBatch) -> DbResult<SeedRollbackReport> {
        self.ensure_ledger().await?;

        let rows = self.batch_rows(batch).await?;
        if rows.is_empty() {
            tracing::warn!(batch, "no seeders in batch");
            return Ok(SeedRollbackReport {
                rolled_back: Vec::new(),
            });
        }

        let mut rolled_back = Vec::new();
        for row in rows {
            match self.registry.get(&row.filename) {
                Some(seeder) if seeder.has_rollback() => {
                    tracing::info!(seeder = %row.filename, batch, "rolling back seeder");
                    seeder
                        .rollback(self.pool.clone())
                        .await
                        .map_err(|e| match e {
                            err @ DbError::Seeder { .. } => err,
                            other => DbError::Seeder {
                                name: row.filename.clone(),
                                message: other.to_string(),
                            },
                        })?;
                }
                Some(_) => {
                    tracing::warn!(
                        seeder = %row.filename,
                        "no backward routine; deleting ledger row anyway"
                    );
                }
                None => {
                    tracing::warn!(
                        seeder = %row.filename,
                        "no longer registered; deleting ledger row anyway"
                    );
                }
            }

            sqlx::query(&ledger::remove_sql(self.table()))
                .bind(&row.filename)
                .bind(batch)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DbError::Ledger(format!(
                        "failed to delete ledger row for {}: {}",
                        row.filename, e
                    ))
                })?;

            rolled_back.push(row.filename);
        }

        tracing::info!(batch, count = rolled_back.len(), "seed batch rolled back");
        Ok(SeedRollbackReport { rolled_back })
    }

    /// Roll back the most recent batch; a logged no-op when the ledger is
    /// empty.
    pub async fn rollback_last_batch(&self) -> DbResult<SeedRollbackReport> {
        self.ensure_ledger().await?;

        let latest = self.latest_batch().await?;
        if latest == 0 {
            tracing::warn!("no seed batch to roll back");
            return Ok(SeedRollbackReport {
                rolled_back: Vec::new(),
            });
        }
        self.rollback_batch(latest).await
    }

    /// Current maximum batch value, 0 when the ledger is empty.
    pub(crate) async fn latest_batch(&self) -> DbResult<SeedBatch> {
        let row = sqlx::query(&ledger::latest_batch_sql(self.table()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to read latest seed batch: {}", e)))?;
        let latest: SeedBatch = row.try_get(0).unwrap_or(0);
        Ok(latest)
    }

    async fn applied_names(&self) -> DbResult<HashSet<String>> {
        let rows = sqlx::query(&ledger::applied_names_sql(self.table()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to read seed ledger: {}", e)))?;

        let mut names = HashSet::new();
        for row in rows {
            let name: String = row
                .try_get("filename")
                .map_err(|e| DbError::Ledger(format!("failed to read filename: {}", e)))?;
            names.insert(name);
        }
        Ok(names)
    }

    /// Ledger rows for one batch, reverse of application order.
    async fn batch_rows(&self, batch: SeedBatch) -> DbResult<Vec<AppliedSeed>> {
        let rows = sqlx::query(&ledger::batch_rows_sql(self.table()))
            .bind(batch)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to read seed batch {}: {}", batch, e)))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(AppliedSeed {
                filename: row
                    .try_get("filename")
                    .map_err(|e| DbError::Ledger(format!("failed to read filename: {}", e)))?,
                batch: row
                    .try_get("batch")
                    .map_err(|e| DbError::Ledger(format!("failed to read batch: {}", e)))?,
                seeded_at: row
                    .try_get("seeded_at")
                    .map_err(|e| DbError::Ledger(format!("failed to read seeded_at: {}", e)))?,
            });
        }
        Ok(records)
    }

    fn table(&self) -> &str {
        &self.config.seeds_table
    }
}

/// Registered seeders with no ledger row, alphabetically by name.
pub(crate) fn pending_seeders(registered: Vec<String>, applied: &HashSet<String>) -> Vec<String> {
    let mut pending: Vec<String> = registered
        .into_iter()
        .filter(|name| !applied.contains(name))
        .collect();
    pending.sort();
    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_excludes_applied_names() {
        let registered = vec!["UserSeeder".to_string(), "ProductSeeder".to_string()];
        let applied: HashSet<String> = ["UserSeeder".to_string()].into();

        assert_eq!(
            pending_seeders(registered, &applied),
            vec!["ProductSeeder"]
        );
    }

    #[test]
    fn pending_is_alphabetical_regardless_of_registration_order() {
        let registered = vec![
            "UserSeeder".to_string(),
            "CategorySeeder".to_string(),
            "ProductSeeder".to_string(),
        ];

        assert_eq!(
            pending_seeders(registered, &HashSet::new()),
            vec!["CategorySeeder", "ProductSeeder", "UserSeeder"]
        );
    }

    #[test]
    fn fully_seeded_registry_has_no_pending() {
        let registered = vec!["UserSeeder".to_string()];
        let applied: HashSet<String> = registered.iter().cloned().collect();
        assert!(pending_seeders(registered, &applied).is_empty());
    }
}
