//! Foodgram management commands
//!
//! ```bash
//! foodgram-cli migrate
//! foodgram-cli import-ingredients --path data/ingredients.json
//! foodgram-cli seed-test-data
//! foodgram-cli create-superuser --email admin@example.com --username admin --password '...'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foodgram_backend::{
    config::AppConfig,
    db,
    services::{IngredientService, MediaStorage, SeedService},
    telemetry,
};
use foodgram_shared::RegisterRequest;
use sqlx::PgPool;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "foodgram-cli")]
#[command(author, version, about = "Foodgram management commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Load ingredients from a JSON file, skipping ones already present
    ImportIngredients {
        #[arg(short, long, default_value = "data/ingredients.json")]
        path: PathBuf,
    },
    /// Create demo users and recipes
    SeedTestData,
    /// Create a staff account with access to /admin/
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "Admin")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }
}

async fn connect(config: &AppConfig) -> Result<PgPool> {
    db::create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("could not connect to the database")
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load()?;
    let pool = connect(&config).await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&pool).await?;
        }
        Commands::ImportIngredients { path } => {
            let report = IngredientService::import_file(&pool, &path).await?;
            info!(
                file = %path.display(),
                total = report.total,
                added = report.added,
                skipped_invalid = report.skipped_invalid,
                "Ingredients imported"
            );
        }
        Commands::SeedTestData => {
            let media = MediaStorage::new(config.media.clone());
            let report = SeedService::seed_test_data(&pool, &media).await?;
            info!(users = report.users, recipes = report.recipes, "Test data seeded");
        }
        Commands::CreateSuperuser {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let req = RegisterRequest {
                email,
                username,
                first_name,
                last_name,
                password,
            };
            SeedService::create_superuser(&pool, req).await?;
        }
    }

    Ok(())
}
