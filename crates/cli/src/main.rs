mod commands;
mod seeds;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loam_db::{DbResult, MigrationBatch, SeedBatch};

#[derive(Parser)]
#[command(name = "loamrs")]
#[command(about = "Batch-tracked database migrations and seeders", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new timestamped migration file
    MakeMigration {
        /// Migration name; `create_*` and `alter_*` names pick matching
        /// templates
        name: String,
    },

    /// Apply a single named migration under a fresh batch
    Migrate {
        /// Migration file stem, e.g. 20240101000000_create_users_table
        file: String,
    },

    /// Execute the backward statements of a named migration
    Rollback {
        /// Migration file stem
        file: String,
    },

    /// Apply every pending migration in one batch
    MigrateAll,

    /// Truncate the migration ledger and re-apply every script
    MigrateFresh,

    /// Roll back every applied batch, newest first
    RollbackAll,

    /// Roll back one migration batch
    RollbackBatch {
        /// Batch number; defaults to the most recent
        #[arg(long)]
        batch: Option<MigrationBatch>,
    },

    /// Scaffold a new seeder skeleton
    MakeSeeder {
        /// Seeder name, e.g. users_seeder
        #[arg(long, short)]
        name: String,
    },

    /// Run every pending seeder
    DbSeed,

    /// Roll back one seed batch
    RollbackSeeder {
        /// Batch value (Unix timestamp); defaults to the most recent
        #[arg(long, short)]
        batch: Option<SeedBatch>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> DbResult<()> {
    match cli.command {
        Commands::MakeMigration { name } => commands::migrate::make_migration(&name),
        Commands::Migrate { file } => commands::migrate::migrate(&file).await,
        Commands::Rollback { file } => commands::migrate::rollback(&file).await,
        Commands::MigrateAll => commands::migrate::migrate_all().await,
        Commands::MigrateFresh => commands::migrate::migrate_fresh().await,
        Commands::RollbackAll => commands::migrate::rollback_all().await,
        Commands::RollbackBatch { batch } => commands::migrate::rollback_batch(batch).await,
        Commands::MakeSeeder { name } => commands::seed::make_seeder(&name),
        Commands::DbSeed => commands::seed::db_seed().await,
        Commands::RollbackSeeder { batch } => commands::seed::rollback_seeder(batch).await,
    }
}
