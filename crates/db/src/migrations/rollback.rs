//! Migration rollback - reverses applied batches.
//!
//! Rollback executes a script's backward statements; batch-scoped
//! operations also delete the ledger rows, reverse of application order.

use sqlx::Row;

use super::definitions::{AppliedMigration, MigrationBatch, RollbackReport};
use super::ledger;
use super::runner::MigrationRunner;
use crate::error::{DbError, DbResult};

/// Rollback operations for [`MigrationRunner`].
pub trait MigrationRollback {
    /// Execute a script's backward statements.
    ///
    /// Leaves the ledger untouched; batch-scoped rollback owns ledger
    /// cleanup. A script without a backward section executes nothing.
    async fn rollback_one(&self, filename: &str) -> DbResult<()>;

    /// Roll back every migration in `batch`, reverse of application
    /// order, deleting each ledger row as it goes.
    async fn rollback_batch(&self, batch: MigrationBatch) -> DbResult<RollbackReport>;

    /// Roll back the most recent batch; a logged no-op when the ledger is
    /// empty.
    async fn rollback_last_batch(&self) -> DbResult<RollbackReport>;

    /// Roll back every batch, newest first.
    async fn rollback_all_batches(&self) -> DbResult<RollbackReport>;
}

impl MigrationRollback for MigrationRunner {
    async fn rollback_one(&self, filename: &str) -> DbResult<()> {
        let script = self.store().load(filename)?;
        if script.backward.is_empty() {
            tracing::warn!(migration = %filename, "script has no backward statements");
            return Ok(());
        }

        let mut tx = self.pool().begin().await.map_err(|e| DbError::Statement {
            name: filename.to_string(),
            message: format!("failed to start transaction: {}", e),
        })?;

        for statement in &script.backward {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::Statement {
                    name: filename.to_string(),
                    message: e.to_string(),
                })?;
        }

        tx.commit().await.map_err(|e| DbError::Statement {
            name: filename.to_string(),
            message: format!("failed to commit: {}", e),
        })?;

        Ok(())
    }

    async fn rollback_batch(&self, batch: MigrationBatch) -> DbResult<RollbackReport> {
        self.ensure_ledger().await?;

        let rows = self.batch_rows(batch).await?;
        let mut rolled_back = Vec::new();

        for row in rows {
            tracing::info!(migration = %row.filename, batch, "rolling back migration");
            self.rollback_one(&row.filename).await?;

            sqlx::query(&ledger::remove_sql(self.table()))
                .bind(&row.filename)
                .execute(self.pool())
                .await
                .map_err(|e| {
                    DbError::Ledger(format!(
                        "failed to delete ledger row for {}: {}",
                        row.filename, e
                    ))
                })?;

            rolled_back.push(row.filename);
        }

        if !rolled_back.is_empty() {
            tracing::info!(batch, count = rolled_back.len(), "batch rolled back");
        }
        Ok(RollbackReport { rolled_back })
    }

    async fn rollback_last_batch(&self) -> DbResult<RollbackReport> {
        self.ensure_ledger().await?;

        let latest = self.latest_batch().await?;
        if latest == 0 {
            tracing::warn!("no batch to roll back");
            return Ok(RollbackReport {
                rolled_back: Vec::new(),
            });
        }
        self.rollback_batch(latest).await
    }

    async fn rollback_all_batches(&self) -> DbResult<RollbackReport> {
        self.ensure_ledger().await?;

        let latest = self.latest_batch().await?;
        let mut rolled_back = Vec::new();
        for batch in (1..=latest).rev() {
            rolled_back.extend(self.rollback_batch(batch).await?.rolled_back);
        }
        Ok(RollbackReport { rolled_back })
    }
}

impl MigrationRunner {
    /// Ledger rows for one batch, reverse of application order.
    async fn batch_rows(&self, batch: MigrationBatch) -> DbResult<Vec<AppliedMigration>> {
        let rows = sqlx::query(&ledger::batch_rows_sql(self.table()))
            .bind(batch)
            .fetch_all(self.pool())
            .await
            .map_err(|e| DbError::Ledger(format!("failed to read batch {}: {}", batch, e)))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(AppliedMigration {
                filename: row
                    .try_get("filename")
                    .map_err(|e| DbError::Ledger(format!("failed to read filename: {}", e)))?,
                batch: row
                    .try_get("batch")
                    .map_err(|e| DbError::Ledger(format!("failed to read batch: {}", e)))?,
                applied_at: row
                    .try_get("applied_at")
                    .map_err(|e| DbError::Ledger(format!("failed to read applied_at: {}", e)))?,
            });
        }
        Ok(records)
    }
}
