//! Script store - filesystem catalog of migration scripts.
//!
//! Scripts are plain `.sql` files keyed by their file stem. The store
//! never caches; every operation reads the directory fresh.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;

use super::definitions::{MigrationConfig, MigrationScript};
use super::parser::{parse_script, DOWN_MARKER, UP_MARKER};
use crate::error::{DbError, DbResult};

/// Filesystem-backed catalog of migration scripts.
pub struct ScriptStore {
    config: MigrationConfig,
}

impl ScriptStore {
    /// Create a store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MigrationConfig::default())
    }

    /// Create a store with a custom configuration.
    pub fn with_config(config: MigrationConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// List every known script stem, lexicographically sorted.
    ///
    /// The timestamp-prefixed naming convention makes this creation order
    /// as well, regardless of filesystem listing order. A missing
    /// directory yields an empty list.
    pub fn list_scripts(&self) -> DbResult<Vec<String>> {
        if !self.config.migrations_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.migrations_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "sql") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read and parse one script by stem.
    pub fn load(&self, filename: &str) -> DbResult<MigrationScript> {
        let path = self.script_path(filename);
        let content = fs::read_to_string(&path).map_err(|e| DbError::Script {
            name: filename.to_string(),
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let (forward, backward) = parse_script(&content);
        Ok(MigrationScript {
            filename: filename.to_string(),
            forward,
            backward,
        })
    }

    /// Scaffold a new timestamped script and return its filename.
    ///
    /// `create_*` names get a table skeleton with a matching `DROP TABLE`;
    /// `alter_*` names get commented column stubs; anything else gets
    /// placeholder comments.
    pub fn scaffold(&self, name: &str) -> DbResult<String> {
        fs::create_dir_all(&self.config.migrations_dir)?;

        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let filename = format!("{}_{}.sql", timestamp, name);
        let (up, down) = migration_template(name);
        let content = format!("{}\n{}\n{}\n{}\n", UP_MARKER, up, DOWN_MARKER, down);

        fs::write(self.config.migrations_dir.join(&filename), content)?;
        Ok(filename)
    }

    fn script_path(&self, filename: &str) -> PathBuf {
        self.config.migrations_dir.join(format!("{}.sql", filename))
    }
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Template bodies keyed by the `create_` / `alter_` naming convention.
fn migration_template(name: &str) -> (String, String) {
    if let Some(table) = name.strip_prefix("create_") {
        let table = table.strip_suffix("_table").unwrap_or(table);
        let up = format!(
            "CREATE TABLE {} (\n    id BIGSERIAL PRIMARY KEY,\n    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n    deleted_at TIMESTAMP NULL DEFAULT NULL\n);",
            table
        );
        let down = format!("DROP TABLE IF EXISTS {};", table);
        return (up, down);
    }

    if let Some(table) = name.strip_prefix("alter_") {
        let table = table.strip_suffix("_table").unwrap_or(table);
        let up = format!("ALTER TABLE {}\n-- ADD COLUMN new_column_name DATA_TYPE;", table);
        let down = format!("ALTER TABLE {}\n-- DROP COLUMN new_column_name;", table);
        return (up, down);
    }

    (
        "-- forward SQL here".to_string(),
        "-- backward SQL here".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ScriptStore {
        ScriptStore::with_config(MigrationConfig {
            migrations_dir: dir.path().to_path_buf(),
            migrations_table: "migrations".to_string(),
        })
    }

    #[test]
    fn scaffold_writes_timestamped_file_with_markers() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let filename = store.scaffold("create_users_table").unwrap();
        assert!(filename.ends_with("_create_users_table.sql"));
        // 14-digit timestamp prefix
        assert_eq!(filename.split('_').next().unwrap().len(), 14);

        let content = fs::read_to_string(dir.path().join(&filename)).unwrap();
        assert!(content.contains(UP_MARKER));
        assert!(content.contains(DOWN_MARKER));
        assert!(content.contains("CREATE TABLE users"));
        assert!(content.contains("DROP TABLE IF EXISTS users;"));
    }

    #[test]
    fn scaffold_alter_template_uses_column_stubs() {
        let (up, down) = migration_template("alter_products_table");
        assert!(up.starts_with("ALTER TABLE products"));
        assert!(up.contains("ADD COLUMN"));
        assert!(down.contains("DROP COLUMN"));
    }

    #[test]
    fn scaffold_fallback_template_is_placeholder_comments() {
        let (up, down) = migration_template("backfill_references");
        assert_eq!(up, "-- forward SQL here");
        assert_eq!(down, "-- backward SQL here");
    }

    #[test]
    fn load_parses_forward_and_backward_statements() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(
            dir.path().join("20240101000000_init.sql"),
            "-- +++ UP Migration\nCREATE TABLE t (id INT);\n-- --- DOWN Migration\nDROP TABLE t;\n",
        )
        .unwrap();

        let script = store.load("20240101000000_init").unwrap();
        assert_eq!(script.filename, "20240101000000_init");
        assert_eq!(script.forward, vec!["CREATE TABLE t (id INT)"]);
        assert_eq!(script.backward, vec!["DROP TABLE t"]);
    }

    #[test]
    fn load_missing_script_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.load("20240101000000_missing").unwrap_err();
        assert!(err.to_string().contains("20240101000000_missing"));
    }

    #[test]
    fn list_scripts_sorts_and_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(dir.path().join("20240102000000_add_col.sql"), "").unwrap();
        fs::write(dir.path().join("20240101000000_init.sql"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let names = store.list_scripts().unwrap();
        assert_eq!(
            names,
            vec!["20240101000000_init", "20240102000000_add_col"]
        );
    }

    #[test]
    fn missing_directory_lists_empty() {
        let store = ScriptStore::with_config(MigrationConfig {
            migrations_dir: PathBuf::from("does/not/exist"),
            migrations_table: "migrations".to_string(),
        });
        assert!(store.list_scripts().unwrap().is_empty());
    }
}
