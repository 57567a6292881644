use chrono::{TimeZone, Utc};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{debug, error, info};
use std::fs;
use std::path::Path;
use std::process;

use hotrelay::RelayBot;
use hotrelay::config::{FeedOverrides, RelayConfig, load_config, load_dotenv};
use hotrelay::domain::RelayOutcome;
use hotrelay::store::SqliteRecordStore;

mod cli;

use cli::{Cli, Commands};

fn setup_logging(config: &RelayConfig, verbose: bool) -> Result<()> {
    let default_level = if verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(log_file) = &config.log_file {
        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }

        let target = Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .context("Failed to open log file")?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();
    Ok(())
}

async fn run_relay(config: &RelayConfig) -> Result<()> {
    let mut store = SqliteRecordStore::open(&config.storage.db_path)
        .with_context(|| format!("Failed to open record store {}", config.storage.db_path.display()))?;
    let bot = RelayBot::from_config(config).context("Failed to set up clients")?;

    match bot.run_once(&mut store).await? {
        RelayOutcome::Published { submission_id, status_url } => {
            println!("{} {} -> {}", "Relayed".green(), submission_id, status_url);
        }
        RelayOutcome::Skipped {
            submission_id,
            content_type,
        } => {
            println!("{} {} ({})", "Skipped".yellow(), submission_id, content_type);
        }
    }

    Ok(())
}

fn show_status(config: &RelayConfig, limit: usize) -> Result<()> {
    let store = SqliteRecordStore::open(&config.storage.db_path)
        .with_context(|| format!("Failed to open record store {}", config.storage.db_path.display()))?;

    for line in status_lines(&store, &config.storage.db_path, limit)? {
        println!("{}", line);
    }

    Ok(())
}

fn status_lines(store: &SqliteRecordStore, db_path: &Path, limit: usize) -> Result<Vec<String>> {
    let processed = store.count_by_processed(true)?;
    let pending = store.count_by_processed(false)?;

    let mut lines = vec![
        format!("{} {}", "Record store:".cyan(), db_path.display()),
        format!("  {} {}", "processed:".green(), processed),
        format!("  {} {}", "pending:".yellow(), pending),
    ];

    for record in store.list_all()?.into_iter().take(limit) {
        let updated = Utc
            .timestamp_millis_opt(record.updated_at)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let flag = if record.processed {
            "processed".green()
        } else {
            "pending".yellow()
        };
        lines.push(format!("  {:<10} {:<10} {}", record.shortcode, flag, updated));
    }

    Ok(lines)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Real environment variables win over .env
    let dotenv_path = load_dotenv()?;

    let cli = Cli::parse();
    let command = cli.command_or_default();

    let overrides = match &command {
        Commands::Run { feed, min_score } => FeedOverrides {
            name: feed.clone(),
            min_score: *min_score,
        },
        Commands::Status { .. } => FeedOverrides::default(),
    };
    let (config, source) = load_config(cli.config.as_ref(), &overrides).context("Failed to load configuration")?;

    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;
    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }
    info!("Loaded config from {}", source);

    match command {
        Commands::Run { .. } => {
            config.validate().context("Invalid configuration")?;

            info!("> Relaying from r/{} (min score {})", config.feed.name, config.feed.min_score);
            if let Err(e) = run_relay(&config).await {
                error!("> Run failed: {:#}", e);
                eprintln!("{} {:#}", "hotrelay error:".red(), e);
                process::exit(1);
            }
        }
        Commands::Status { limit } => show_status(&config, limit)?,
    }

    Ok(())
}
