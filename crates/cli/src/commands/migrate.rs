//! Migration commands.

use loam_db::{
    DbResult, MigrationBatch, MigrationRollback, MigrationRunner, RollbackReport, ScriptStore,
};

use super::database_url;

async fn runner() -> DbResult<MigrationRunner> {
    MigrationRunner::from_url(ScriptStore::new(), &database_url()).await
}

pub fn make_migration(name: &str) -> DbResult<()> {
    let filename = ScriptStore::new().scaffold(name)?;
    println!("✅ Created migration: {}", filename);
    Ok(())
}

pub async fn migrate(file: &str) -> DbResult<()> {
    println!("🚀 Migrate: {}", file);
    let report = runner().await?.apply_one(file).await?;
    if let Some(batch) = report.batch {
        println!("✅ Applied {} (batch {})", file, batch);
    }
    Ok(())
}

pub async fn rollback(file: &str) -> DbResult<()> {
    println!("🔄 Rollback: {}", file);
    runner().await?.rollback_one(file).await?;
    println!("✅ Rolled back {}", file);
    Ok(())
}

pub async fn migrate_all() -> DbResult<()> {
    println!("🚀 Migrate all");
    let report = runner().await?.apply_pending_all().await?;
    match report.batch {
        Some(batch) => println!(
            "✅ Batch {} applied ({} migrations)",
            batch,
            report.applied.len()
        ),
        None => println!("✅ Nothing to migrate"),
    }
    Ok(())
}

pub async fn migrate_fresh() -> DbResult<()> {
    println!("🔄 Fresh: truncating ledger and re-applying every migration");
    let report = runner().await?.fresh().await?;
    println!("✅ Re-applied {} migrations", report.applied.len());
    Ok(())
}

pub async fn rollback_all() -> DbResult<()> {
    println!("🔄 Rollback all");
    let report = runner().await?.rollback_all_batches().await?;
    print_rollback(&report);
    Ok(())
}

pub async fn rollback_batch(batch: Option<MigrationBatch>) -> DbResult<()> {
    let runner = runner().await?;
    let report = match batch {
        Some(batch) => {
            println!("🔄 Rollback batch {}", batch);
            runner.rollback_batch(batch).await?
        }
        None => {
            println!("🔄 Rollback last batch");
            runner.rollback_last_batch().await?
        }
    };
    print_rollback(&report);
    Ok(())
}

fn print_rollback(report: &RollbackReport) {
    if report.rolled_back.is_empty() {
        println!("✅ Nothing to roll back");
    } else {
        println!("✅ Rolled back {} migrations", report.rolled_back.len());
    }
}
