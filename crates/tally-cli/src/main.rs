use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tally_cli::commands::{delete, list, stats, status, timer, util, watch};
use tally_cli::{Cli, Commands, Config};
use tally_core::EntryStore;
use tally_db::SqliteStore;

/// Load config and open the entry store, ensuring the database directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(EntryStore<SqliteStore>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = SqliteStore::open(&config.database_path).context("failed to open database")?;
    let store = EntryStore::open(db, config.storage_key.clone());
    if !store.is_loaded() {
        anyhow::bail!(
            "failed to read time entries from {}",
            config.database_path.display()
        );
    }
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

    let (mut store, config) = open_store(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    let now = Utc::now();

    match command {
        Commands::Start { at } => {
            let at = util::resolve_time(at.as_deref(), now)?;
            timer::start(&mut stdout, &mut store, at, &Local)?;
        }
        Commands::Stop { at } => {
            let at = util::resolve_time(at.as_deref(), now)?;
            timer::stop(&mut stdout, &mut store, at, &Local)?;
        }
        Commands::Toggle { at } => {
            let at = util::resolve_time(at.as_deref(), now)?;
            timer::toggle(&mut stdout, &mut store, at, &Local)?;
        }
        Commands::Status { json } => {
            status::run(&mut stdout, store.active_entry(), now, &Local, *json)?;
        }
        Commands::List { month, year, json } => {
            let today = now.with_timezone(&Local);
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            list::run(&mut stdout, store.entries(), year, month, &Local, *json)?;
        }
        Commands::Stats { json } => {
            let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
            stats::run(
                &mut stdout,
                store.entries(),
                &now.with_timezone(&Local),
                config.week_start,
                &timezone,
                *json,
            )?;
        }
        Commands::Delete { id } => {
            delete::run(&mut stdout, &mut store, id)?;
        }
        Commands::Watch { ticks } => {
            drop(stdout);
            watch::run(std::io::stdout(), store.active_entry(), *ticks)?;
        }
    }

    Ok(())
}
