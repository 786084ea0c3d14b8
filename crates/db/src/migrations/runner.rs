//! Migration runner - applies pending scripts against the database.
//!
//! Handles ledger bookkeeping, batch allocation, and the apply operations.
//! Rollback lives in the sibling `rollback` module.

use sqlx::{PgPool, Row};
use std::collections::HashSet;

use super::definitions::{ApplyReport, MigrationBatch, MigrationScript};
use super::ledger;
use super::store::ScriptStore;
use crate::error::{DbError, DbResult};

/// Applies migration scripts and records them in the ledger.
///
/// The pool is injected at construction; the runner holds no global state
/// and two runners over different pools are fully independent.
pub struct MigrationRunner {
    store: ScriptStore,
    pool: PgPool,
}

impl MigrationRunner {
    /// Create a runner over an existing pool.
    pub fn new(store: ScriptStore, pool: PgPool) -> Self {
        Self { store, pool }
    }

    /// Connect to `database_url` and build a runner over the new pool.
    pub async fn from_url(store: ScriptStore, database_url: &str) -> DbResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| DbError::Connection(format!("failed to connect to database: {}", e)))?;
        Ok(Self::new(store, pool))
    }

    /// Get the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the script store.
    pub fn store(&self) -> &ScriptStore {
        &self.store
    }

    /// Idempotently create the ledger table.
    pub async fn ensure_ledger(&self) -> DbResult<()> {
        sqlx::query(&ledger::create_table_sql(self.table()))
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to create ledger table: {}", e)))?;
        Ok(())
    }

    /// Apply every pending script in lexicographic order under one batch.
    ///
    /// The pending set is computed once at the start of the run. Each
    /// script's forward statements and its ledger row commit in one
    /// transaction; the first failure aborts the run and leaves earlier
    /// scripts applied and recorded.
    pub async fn apply_pending_all(&self) -> DbResult<ApplyReport> {
        self.ensure_ledger().await?;

        let batch = self.latest_batch().await? + 1;
        let all = self.store.list_scripts()?;
        let applied = self.applied_filenames().await?;
        let pending = pending_filenames(all, &applied);

        if pending.is_empty() {
            tracing::info!("no pending migrations");
            return Ok(ApplyReport {
                batch: None,
                applied: Vec::new(),
                skipped: applied.len(),
            });
        }

        for filename in &pending {
            let script = self.store.load(filename)?;
            tracing::info!(migration = %filename, batch, "applying migration");
            self.apply_script(&script, batch).await?;
        }

        tracing::info!(batch, count = pending.len(), "batch applied");
        Ok(ApplyReport {
            batch: Some(batch),
            applied: pending,
            skipped: applied.len(),
        })
    }

    /// Apply one named script under a fresh batch.
    ///
    /// Fails when the script already has a ledger row; re-applying
    /// requires rolling it back first.
    pub async fn apply_one(&self, filename: &str) -> DbResult<ApplyReport> {
        self.ensure_ledger().await?;

        if self.is_applied(filename).await? {
            return Err(DbError::Script {
                name: filename.to_string(),
                message: "already applied".to_string(),
            });
        }

        let batch = self.latest_batch().await? + 1;
        let script = self.store.load(filename)?;
        tracing::info!(migration = %filename, batch, "applying migration");
        self.apply_script(&script, batch).await?;

        Ok(ApplyReport {
            batch: Some(batch),
            applied: vec![filename.to_string()],
            skipped: 0,
        })
    }

    /// Truncate the ledger and replay every known script from scratch.
    pub async fn fresh(&self) -> DbResult<ApplyReport> {
        self.ensure_ledger().await?;

        sqlx::query(&ledger::truncate_sql(self.table()))
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to truncate ledger: {}", e)))?;
        tracing::info!("migration ledger truncated");

        self.apply_pending_all().await
    }

    /// Execute a script's forward statements and record it, atomically.
    async fn apply_script(&self, script: &MigrationScript, batch: MigrationBatch) -> DbResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| DbError::Statement {
            name: script.filename.clone(),
            message: format!("failed to start transaction: {}", e),
        })?;

        for statement in &script.forward {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::Statement {
                    name: script.filename.clone(),
                    message: e.to_string(),
                })?;
        }

        sqlx::query(&ledger::record_sql(self.table()))
            .bind(&script.filename)
            .bind(batch)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DbError::Ledger(format!("failed to record {}: {}", script.filename, e))
            })?;

        tx.commit().await.map_err(|e| DbError::Statement {
            name: script.filename.clone(),
            message: format!("failed to commit: {}", e),
        })?;

        Ok(())
    }

    /// Current maximum batch number, 0 when the ledger is empty.
    pub(crate) async fn latest_batch(&self) -> DbResult<MigrationBatch> {
        let row = sqlx::query(&ledger::latest_batch_sql(self.table()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to read latest batch: {}", e)))?;
        let latest: MigrationBatch = row.try_get(0).unwrap_or(0);
        Ok(latest)
    }

    /// Whether a filename has a ledger row.
    pub(crate) async fn is_applied(&self, filename: &str) -> DbResult<bool> {
        let row = sqlx::query(&ledger::check_applied_sql(self.table()))
            .bind(filename)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to check ledger: {}", e)))?;
        Ok(row.is_some())
    }

    async fn applied_filenames(&self) -> DbResult<HashSet<String>> {
        let rows = sqlx::query(&ledger::applied_filenames_sql(self.table()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::Ledger(format!("failed to read ledger: {}", e)))?;

        let mut names = HashSet::new();
        for row in rows {
            let filename: String = row
                .try_get("filename")
                .map_err(|e| DbError::Ledger(format!("failed to read filename: {}", e)))?;
            names.insert(filename);
        }
        Ok(names)
    }

    pub(crate) fn table(&self) -> &str {
        &self.store.config().migrations_table
    }
}

/// Scripts with no ledger row, in lexicographic order.
pub(crate) fn pending_filenames(all: Vec<String>, applied: &HashSet<String>) -> Vec<String> {
    let mut pending: Vec<String> = all
        .into_iter()
        .filter(|filename| !applied.contains(filename))
        .collect();
    pending.sort();
    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_excludes_applied_filenames() {
        let all = vec![
            "20240101000000_init".to_string(),
            "20240102000000_add_col".to_string(),
            "20240103000000_add_index".to_string(),
        ];
        let applied: HashSet<String> = ["20240102000000_add_col".to_string()].into();

        let pending = pending_filenames(all, &applied);
        assert_eq!(
            pending,
            vec!["20240101000000_init", "20240103000000_add_index"]
        );
    }

    #[test]
    fn pending_is_lexicographically_ordered() {
        let all = vec![
            "20240102000000_add_col".to_string(),
            "20240101000000_init".to_string(),
        ];
        let pending = pending_filenames(all, &HashSet::new());
        assert_eq!(
            pending,
            vec!["20240101000000_init", "20240102000000_add_col"]
        );
    }

    #[test]
    fn fully_applied_set_has_no_pending() {
        let all = vec!["20240101000000_init".to_string()];
        let applied: HashSet<String> = all.iter().cloned().collect();
        assert!(pending_filenames(all, &applied).is_empty());
    }
}
