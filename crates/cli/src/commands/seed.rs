//! Seeder commands.

use chrono::Utc;
use std::fs;

use loam_db::{DbResult, SeedBatch, SeedConfig, SeedRunner};

use super::database_url;
use crate::seeds;

async fn runner() -> DbResult<SeedRunner> {
    SeedRunner::from_url(seeds::registry(), &database_url()).await
}

pub fn make_seeder(name: &str) -> DbResult<()> {
    let config = SeedConfig::default();
    fs::create_dir_all(&config.seeds_dir)?;

    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let filename = format!("{}_{}.rs", timestamp, name);
    fs::write(config.seeds_dir.join(&filename), seeder_template(name, &filename))?;

    println!("✅ Created seeder: {}", filename);
    println!("   Register it in seeds/mod.rs to include it in db-seed runs.");
    Ok(())
}

pub async fn db_seed() -> DbResult<()> {
    println!("🌱 Seeding database");
    let report = runner().await?.apply_pending_all().await?;
    match report.batch {
        Some(batch) => println!(
            "✅ Seed batch {} applied ({} seeders)",
            batch,
            report.seeded.len()
        ),
        None => println!("✅ Nothing to seed"),
    }
    Ok(())
}

pub async fn rollback_seeder(batch: Option<SeedBatch>) -> DbResult<()> {
    let runner = runner().await?;
    let report = match batch {
        Some(batch) => {
            println!("🔄 Rollback seed batch {}", batch);
            runner.rollback_batch(batch).await?
        }
        None => {
            println!("🔄 Rollback last seed batch");
            runner.rollback_last_batch().await?
        }
    };
    if report.rolled_back.is_empty() {
        println!("✅ Nothing to roll back");
    } else {
        println!("✅ Rolled back {} seeders", report.rolled_back.len());
    }
    Ok(())
}

/// Skeleton body for a scaffolded seeder module.
fn seeder_template(name: &str, filename: &str) -> String {
    let seeder_name = camel_case(name);
    let module = name.to_lowercase();
    format!(
        "//! {seeder_name} seed routines.\n\
         //!\n\
         //! Register in seeds/mod.rs:\n\
         //!\n\
         //!     #[path = \"{filename}\"]\n\
         //!     mod {module};\n\
         //!     // ...\n\
         //!     .add(Seeder::new(\"{seeder_name}\", {module}::run).with_rollback({module}::rollback))\n\
         \n\
         use loam_db::DbResult;\n\
         use sqlx::PgPool;\n\
         \n\
         pub async fn run(_pool: PgPool) -> DbResult<()> {{\n\
             tracing::info!(\"seeding {seeder_name}\");\n\
             // sqlx::query(\"INSERT INTO ...\").execute(&_pool).await?;\n\
             Ok(())\n\
         }}\n\
         \n\
         pub async fn rollback(_pool: PgPool) -> DbResult<()> {{\n\
             tracing::info!(\"rolling back {seeder_name}\");\n\
             // sqlx::query(\"DELETE FROM ...\").execute(&_pool).await?;\n\
             Ok(())\n\
         }}\n"
    )
}

/// `users_seeder` -> `UsersSeeder`.
fn camel_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_cases_snake_names() {
        assert_eq!(camel_case("users_seeder"), "UsersSeeder");
        assert_eq!(camel_case("user"), "User");
        assert_eq!(camel_case("product__catalog"), "ProductCatalog");
    }

    #[test]
    fn template_defines_run_and_rollback() {
        let body = seeder_template("users_seeder", "20240101000000_users_seeder.rs");
        assert!(body.contains("pub async fn run(_pool: PgPool) -> DbResult<()>"));
        assert!(body.contains("pub async fn rollback(_pool: PgPool) -> DbResult<()>"));
        assert!(body.contains("Seeder::new(\"UsersSeeder\""));
        assert!(body.contains("#[path = \"20240101000000_users_seeder.rs\"]"));
    }
}
