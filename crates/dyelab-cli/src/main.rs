use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dyelab_infrastructure::{ConfigService, init_logging};

mod commands;

#[derive(Parser)]
#[command(name = "dyelab")]
#[command(about = "Dyelab CLI - dye recipe to colour prediction", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/dyelab/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the colour for a complete recipe
    Predict {
        /// Recipe JSON: a file path, '-' for stdin, or an inline object
        #[arg(long)]
        input: String,

        /// Model artifact, overriding the configured path
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Report which parameters a recipe is missing
    Check {
        /// Recipe JSON: a file path, '-' for stdin, or an inline object
        #[arg(long)]
        input: String,
    },
    /// List the recipe parameters and their valid ranges
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigService::load(cli.config.as_deref()).context("failed to load config")?;
    init_logging(&config.logging.level);

    match cli.command {
        Commands::Predict { input, model } => commands::predict::run(&config, &input, model).await?,
        Commands::Check { input } => commands::check::run(&input)?,
        Commands::Schema => commands::schema::run(),
    }

    Ok(())
}
