//! Feedscope CLI
//!
//! Hybrid search and AI insights over customer feedback.

use anyhow::Result;
use clap::Parser;
use feedscope_core::error::exit_codes;
use feedscope_core::{Config, Database, FeedscopeError};
use std::path::PathBuf;
use std::process::ExitCode;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so `--format json` output stays parseable
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // FEEDSCOPE_CONFIG overrides the default config location
    let config = match std::env::var("FEEDSCOPE_CONFIG") {
        Ok(path) => Config::load_from(&PathBuf::from(path))?,
        Err(_) => Config::load()?,
    };

    let db_path = std::env::var("FEEDSCOPE_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Database::default_path());
    let db = Database::open(&db_path)?;
    db.initialize()?;

    match cli.command {
        Commands::Submit(args) => commands::submit::run(args, &db, &config, cli.format).await,
        Commands::List(args) => commands::list::run(args, &db, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &db, &config, cli.format).await,
        Commands::Insights(args) => commands::insights::run(args, &db, &config, cli.format).await,
        Commands::Ask(args) => commands::ask::run(args, &db, &config, cli.format).await,
        Commands::Embed(args) => commands::embed::run(args, &db, &config, cli.format).await,
        Commands::Status => commands::status::run(&db, &config, cli.format).await,
    }
}

fn exit_code(error: &anyhow::Error) -> u8 {
    let code = error
        .downcast_ref::<FeedscopeError>()
        .map(FeedscopeError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR);
    u8::try_from(code).unwrap_or(1)
}
