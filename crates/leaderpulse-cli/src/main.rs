mod analyze;
mod collect;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use leaderpulse_core::{EntitiesFile, EntityConfig};

#[derive(Debug, Parser)]
#[command(name = "leaderpulse")]
#[command(about = "Collect and analyze the public timelines of tracked leaders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Pull new posts for each tracked handle and merge them into the raw table
    Collect {
        /// `build` backfills to the floor date; `refresh` fetches posts newer
        /// than the newest stored one
        #[arg(long, value_enum, default_value_t = CollectMode::Refresh)]
        mode: CollectMode,

        /// Restrict collection to one handle
        #[arg(long)]
        handle: Option<String>,

        /// Print what would be collected without calling the API or touching
        /// the data directory
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild the cleaned and frequency tables from the raw table
    Analyze,
    /// Refresh collection, then analyze
    Run {
        /// Restrict collection to one handle; analysis always covers the full roster
        #[arg(long)]
        handle: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CollectMode {
    Build,
    Refresh,
}

impl std::fmt::Display for CollectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectMode::Build => f.write_str("build"),
            CollectMode::Refresh => f.write_str("refresh"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = leaderpulse_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let roster = leaderpulse_core::load_entities(&config.entities_path)
        .with_context(|| format!("failed to load {}", config.entities_path.display()))?;

    match cli.command {
        Commands::Collect {
            mode,
            handle,
            dry_run,
        } => {
            let targets = select_entities(&roster, handle.as_deref())?;
            collect::run_collect(&config, &targets, mode, dry_run).await?;
        }
        Commands::Analyze => analyze::run_analyze(&config, &roster.entities)?,
        Commands::Run { handle } => {
            let targets = select_entities(&roster, handle.as_deref())?;
            collect::run_collect(&config, &targets, CollectMode::Refresh, false).await?;
            analyze::run_analyze(&config, &roster.entities)?;
        }
    }

    Ok(())
}

/// The whole roster, or the single entity named by `handle`.
fn select_entities(
    roster: &EntitiesFile,
    handle: Option<&str>,
) -> anyhow::Result<Vec<EntityConfig>> {
    match handle {
        None => Ok(roster.entities.clone()),
        Some(h) => roster
            .only(h)
            .map(|e| vec![e])
            .ok_or_else(|| anyhow::anyhow!("handle '{h}' is not in the entity roster")),
    }
}
