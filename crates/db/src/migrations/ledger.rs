//! Ledger SQL for the migration engine.
//!
//! The ledger is an append-only table, one row per applied migration.
//! There is no uniqueness constraint on `filename`; the engine enforces
//! the one-row-per-filename intent through its pending checks.

pub(crate) fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    \
            id SERIAL PRIMARY KEY,\n    \
            filename VARCHAR(255) NOT NULL,\n    \
            batch INTEGER NOT NULL,\n    \
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
        )",
        table
    )
}

pub(crate) fn record_sql(table: &str) -> String {
    format!("INSERT INTO {} (filename, batch) VALUES ($1, $2)", table)
}

pub(crate) fn latest_batch_sql(table: &str) -> String {
    format!("SELECT COALESCE(MAX(batch), 0) FROM {}", table)
}

pub(crate) fn check_applied_sql(table: &str) -> String {
    format!("SELECT id FROM {} WHERE filename = $1", table)
}

pub(crate) fn applied_filenames_sql(table: &str) -> String {
    format!("SELECT filename FROM {}", table)
}

/// Rows for one batch, reverse of application order.
pub(crate) fn batch_rows_sql(table: &str) -> String {
    format!(
        "SELECT filename, batch, applied_at FROM {} WHERE batch = $1 ORDER BY id DESC",
        table
    )
}

pub(crate) fn remove_sql(table: &str) -> String {
    format!("DELETE FROM {} WHERE filename = $1", table)
}

pub(crate) fn truncate_sql(table: &str) -> String {
    format!("TRUNCATE {}", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_is_idempotent_and_matches_schema() {
        let sql = create_table_sql("migrations");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS migrations"));
        assert!(sql.contains("id SERIAL PRIMARY KEY"));
        assert!(sql.contains("filename VARCHAR(255) NOT NULL"));
        assert!(sql.contains("batch INTEGER NOT NULL"));
        assert!(sql.contains("applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn batch_rows_are_ordered_by_descending_id() {
        let sql = batch_rows_sql("migrations");
        assert!(sql.contains("WHERE batch = $1"));
        assert!(sql.ends_with("ORDER BY id DESC"));
    }

    #[test]
    fn latest_batch_defaults_to_zero() {
        assert_eq!(
            latest_batch_sql("migrations"),
            "SELECT COALESCE(MAX(batch), 0) FROM migrations"
        );
    }

    #[test]
    fn table_name_is_configurable() {
        assert!(record_sql("custom_ledger").starts_with("INSERT INTO custom_ledger"));
        assert!(remove_sql("custom_ledger").starts_with("DELETE FROM custom_ledger"));
        assert_eq!(truncate_sql("custom_ledger"), "TRUNCATE custom_ledger");
    }
}
