use std::path::Path;

use anyhow::{Context, Result};
use bt_core::Tracker;
use bt_store::FileLogStore;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bt_cli::commands::{day, edit, histogram, history, log, naps, record, status};
use bt_cli::{Cli, Commands, Config};

/// Load config and open the log store, creating its files if needed.
fn open_store(config_path: Option<&Path>) -> Result<(FileLogStore, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let store = FileLogStore::open(&config.log_path, &config.archive_path)
        .context("failed to open log store")?;
    Ok((store, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (store, config) = open_store(cli.config.as_deref())?;
    let now = chrono::Local::now().naive_local();
    let stdout = &mut std::io::stdout().lock();

    let tracker = Tracker::new(store, config.retain_count);
    match command {
        Commands::Record {
            activity,
            notes,
            time,
        } => record::run(stdout, &tracker, activity, notes, time, now)?,
        Commands::Log { reverse, all, json } => log::run(stdout, &tracker, *reverse, *all, *json)?,
        Commands::Edit => edit::run(&mut std::io::stdin().lock(), stdout, &tracker)?,
        Commands::Day { date, json } => day::run(stdout, &tracker, date.as_deref(), *json, now)?,
        Commands::History {
            days,
            exclude_anomalies,
            json,
        } => history::run(stdout, &tracker, *days, *exclude_anomalies, *json, now)?,
        Commands::Histogram { days, json } => histogram::run(stdout, &tracker, *days, *json, now)?,
        Commands::Naps { date, json } => naps::run(stdout, &tracker, date.as_deref(), *json, now)?,
        Commands::Status => status::run(stdout, tracker.store(), &config)?,
    }

    Ok(())
}
