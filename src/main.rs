use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use warta::config::Config;
use warta::export;
use warta::pipeline;
use warta::source;
use warta::storage::{Database, DatabaseError};

#[derive(Parser, Debug)]
#[command(
    name = "warta",
    about = "News-article ETL pipeline: HTML index + RSS/Atom feeds into SQLite"
)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "warta.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one extract-normalize-dedup-load cycle
    Run,
    /// Export all stored articles to a CSV file
    Export {
        /// Destination CSV path
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config).context("Failed to load configuration")?;

    match args.command {
        Command::Run => {
            if let Some(parent) = config.db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }

            let db = open_store(&config).await?;
            let client = source::build_client(config.request_timeout())
                .context("Failed to build HTTP client")?;

            let summary = pipeline::run(&config, &db, &client).await?;
            println!(
                "Loaded {} new articles ({} extracted, {} unique).",
                summary.inserted, summary.extracted, summary.unique
            );
        }
        Command::Export { output } => {
            export::ensure_store_exists(&config.db_path)?;
            let db = open_store(&config).await?;

            let report = export::export_csv(&db, &output).await?;
            println!("Exported {} rows to {}", report.rows, output.display());
            if !report.preview.is_empty() {
                println!("First rows:");
                for row in &report.preview {
                    println!("  [{}] {} | {} | {}", row.id, row.source, row.published_at, row.title);
                }
            }
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<Database> {
    let db_path = config
        .db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;

    match Database::open(db_path).await {
        Ok(db) => Ok(db),
        Err(DatabaseError::Locked) => {
            eprintln!("Error: {}", DatabaseError::Locked);
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open article store: {}", e)),
    }
}
