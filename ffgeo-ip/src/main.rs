//! ffgeo-ip - first-filing imputation pipeline
//!
//! Batch tool: reads the bibliographic store, rebuilds the first filing,
//! bridge and imputed location tables, and appends a run summary.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ffgeo_common::config::{resolve_database_path, TomlConfig};
use ffgeo_common::db::{check_input_schema, open_store, StoreMode};
use ffgeo_common::model::{Criterion, Variant};
use ffgeo_ip::{run_on_store, PipelineOptions};
use tracing::{error, info};

/// Command-line arguments for ffgeo-ip
#[derive(Parser, Debug)]
#[command(name = "ffgeo-ip")]
#[command(about = "First-filing geography imputation pipeline")]
#[command(version)]
struct Args {
    /// Bootstrap TOML file (default: FFGEO_CONFIG, then ~/.config/ffgeo/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite store holding input and output tables (default: FFGEO_DATABASE, then config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and rebuild the output tables
    Run {
        /// Criterion to impute (default: from config)
        #[arg(long, value_enum)]
        criterion: Option<CriterionArg>,

        /// Payload to impute (default: from config)
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Also write the run summary to this JSON file
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
    /// Validate configuration and input schema without writing anything
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CriterionArg {
    Inventor,
    Applicant,
    Both,
}

impl CriterionArg {
    fn criteria(self) -> BTreeSet<Criterion> {
        match self {
            CriterionArg::Inventor => BTreeSet::from([Criterion::Inventor]),
            CriterionArg::Applicant => BTreeSet::from([Criterion::Applicant]),
            CriterionArg::Both => BTreeSet::from([Criterion::Inventor, Criterion::Applicant]),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    Geo,
    Country,
    Both,
}

impl VariantArg {
    fn variants(self) -> BTreeSet<Variant> {
        match self {
            VariantArg::Geo => BTreeSet::from([Variant::Geo]),
            VariantArg::Country => BTreeSet::from([Variant::Country]),
            VariantArg::Both => BTreeSet::from([Variant::Geo, Variant::Country]),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing exists so its level can apply
    let config = TomlConfig::load_or_default(args.config.as_deref());
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    info!(
        "Starting ffgeo-ip v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Err(e) = run(args, config).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args, config: ffgeo_common::Result<TomlConfig>) -> Result<()> {
    let config = config.context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let db_path = resolve_database_path(args.database.as_deref(), &config)
        .context("Failed to resolve database path")?;
    info!("Database path: {}", db_path.display());

    match args.command {
        Command::Check => {
            let pool = open_store(&db_path, StoreMode::ReadOnly)
                .await
                .context("Failed to open database")?;
            check_input_schema(&pool)
                .await
                .context("Input schema check failed")?;
            info!("Configuration and input schema OK");
        }
        Command::Run {
            criterion,
            variant,
            summary_json,
        } => {
            let mut options = PipelineOptions::from_config(&config);
            if let Some(c) = criterion {
                options.criteria = c.criteria();
            }
            if let Some(v) = variant {
                options.variants = v.variants();
            }

            let pool = open_store(&db_path, StoreMode::ReadWrite)
                .await
                .context("Failed to open database")?;
            let output = run_on_store(&pool, &options)
                .await
                .context("Pipeline run failed")?;

            output.summary.log();
            if let Some(path) = summary_json {
                output
                    .summary
                    .write_json(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
    }

    Ok(())
}
