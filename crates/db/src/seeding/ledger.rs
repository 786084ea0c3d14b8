//! Ledger SQL for the seed engine.
//!
//! Same shape as the migration ledger, except `batch` is a BIGINT holding
//! a Unix timestamp, and deletion is scoped to name and batch.

pub(crate) fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    \
            id SERIAL PRIMARY KEY,\n    \
            filename VARCHAR(255) NOT NULL,\n    \
            batch BIGINT NOT NULL,\n    \
            seeded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
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

pub(crate) fn applied_names_sql(table: &str) -> String {
    format!("SELECT filename FROM {}", table)
}

/// Rows for one batch, reverse of application order.
pub(crate) fn batch_rows_sql(table: &str) -> String {
    format!(
        "SELECT filename, batch, seeded_at FROM {} WHERE batch = $1 ORDER BY id DESC",
        table
    )
}

pub(crate) fn remove_sql(table: &str) -> String {
    format!("DELETE FROM {} WHERE filename = $1 AND batch = $2", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_uses_bigint_batches() {
        let sql = create_table_sql("seeds");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS seeds"));
        assert!(sql.contains("batch BIGINT NOT NULL"));
        assert!(sql.contains("seeded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn batch_rows_are_ordered_by_descending_id() {
        let sql = batch_rows_sql("seeds");
        assert!(sql.contains("WHERE batch = $1"));
        assert!(sql.ends_with("ORDER BY id DESC"));
    }

    #[test]
    fn removal_is_scoped_to_name_and_batch() {
        assert_eq!(
            remove_sql("seeds"),
            "DELETE FROM seeds WHERE filename = $1 AND batch = $2"
        );
    }
}
