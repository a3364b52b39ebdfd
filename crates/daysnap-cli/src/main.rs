//! daysnap - pin daily photo snapshots to IPFS and browse minted ones.
//!
//! Wallet connection and minting happen in the mobile front end; this
//! binary covers the parts that need no wallet: configuration, the Pinata
//! credential, pinning, and browsing a creator's snapshots.

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use daysnap_core::api::{DasClient, PinataClient};
use daysnap_core::auth::CredentialStore;
use daysnap_core::cache::CacheManager;
use daysnap_core::config::{Config, PINATA_JWT_ENV};
use daysnap_core::models::{Cluster, SnapshotMetadata};
use daysnap_core::snapshot::browse_snapshots;
use daysnap_core::utils::{format_day, short_address};
use daysnap_core::Pubkey;

/// Prefix of the daily rolling log file in the cache directory
const LOG_FILE_PREFIX: &str = "daysnap.log";

#[derive(Parser)]
#[command(name = "daysnap", version, about = "One photo a day, minted on Solana")]
struct Cli {
    /// Also write logs to a daily file in the cache directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the Pinata JWT in the OS keychain
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
    /// Pin an image file and print its CID
    PinImage { path: PathBuf },
    /// Pin a snapshot metadata document for an already pinned image
    PinMetadata {
        image_cid: String,
        /// Capture time in unix milliseconds (defaults to now)
        #[arg(long)]
        taken_at: Option<i64>,
    },
    /// List snapshots minted by a creator address
    List { creator: Option<String> },
    /// Show the cached snapshot list for a creator address
    Cached { creator: Option<String> },
    /// Print the snapshot name for today
    DayName,
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    SetCluster { cluster: String },
    SetRpc { url: Option<String> },
    SetGateway { host: String },
}

#[derive(Subcommand)]
enum CredentialsAction {
    Set { jwt: String },
    Clear,
    Status,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    config.apply_env();

    let log_dir = if cli.log_file {
        Some(config.cache_dir()?)
    } else {
        None
    };
    let _log_guard = init_tracing(log_dir.as_deref());
    info!(cluster = %config.cluster, "daysnap starting");

    match cli.command {
        Command::Config { action } => run_config(action, config),
        Command::Credentials { action } => run_credentials(action),
        Command::PinImage { path } => pin_image(&config, &path).await,
        Command::PinMetadata { image_cid, taken_at } => {
            pin_metadata(&config, &image_cid, taken_at).await
        }
        Command::List { creator } => list_snapshots(config, creator).await,
        Command::Cached { creator } => show_cached(&config, creator),
        Command::DayName => {
            println!("{}", format_day(Local::now().date_naive()));
            Ok(())
        }
    }
}

fn run_config(action: ConfigAction, mut config: Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            println!("config file: {}", Config::config_path()?.display());
            println!("rpc: {}", config.rpc_url());
            if config.das_url().is_err() {
                println!("das: not configured (see `config set-rpc`)");
            }
            return Ok(());
        }
        ConfigAction::SetCluster { cluster } => {
            config.cluster = Cluster::from_str(&cluster).map_err(anyhow::Error::msg)?;
        }
        ConfigAction::SetRpc { url } => config.rpc_endpoint = url,
        ConfigAction::SetGateway { host } => config.pinata_gateway = host,
    }
    config.save()?;
    println!("Saved {}", Config::config_path()?.display());
    Ok(())
}

fn run_credentials(action: CredentialsAction) -> Result<()> {
    match action {
        CredentialsAction::Set { jwt } => {
            CredentialStore::store_pinata_jwt(jwt.trim())?;
            println!("Pinata JWT stored in keychain");
        }
        CredentialsAction::Clear => {
            CredentialStore::delete_pinata_jwt()?;
            println!("Pinata JWT removed from keychain");
        }
        CredentialsAction::Status => {
            let env = std::env::var(PINATA_JWT_ENV).is_ok();
            println!("keychain: {}", if CredentialStore::has_pinata_jwt() { "set" } else { "not set" });
            println!("{}: {}", PINATA_JWT_ENV, if env { "set" } else { "not set" });
        }
    }
    Ok(())
}

/// Pinata JWT from the environment, falling back to the keychain
fn pinata_jwt() -> Result<String> {
    if let Ok(jwt) = std::env::var(PINATA_JWT_ENV) {
        if !jwt.trim().is_empty() {
            debug!("Using Pinata JWT from environment");
            return Ok(jwt.trim().to_string());
        }
    }
    CredentialStore::pinata_jwt()
        .with_context(|| format!("No Pinata JWT; run `daysnap credentials set` or set {}", PINATA_JWT_ENV))
}

fn pinata(config: &Config) -> Result<PinataClient> {
    Ok(PinataClient::from_config(config, pinata_jwt()?)?)
}

async fn pin_image(config: &Config, path: &Path) -> Result<()> {
    let client = pinata(config)?;
    let cid = client.pin_file(path).await?;
    println!("{}", cid);
    println!("{}", client.gateway_url(&cid));
    Ok(())
}

async fn pin_metadata(config: &Config, image_cid: &str, taken_at: Option<i64>) -> Result<()> {
    let taken_at = match taken_at {
        Some(millis) => chrono::DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp: {}", millis))?,
        None => Utc::now(),
    };
    let name = format_day(taken_at.with_timezone(&Local).date_naive());
    let metadata = SnapshotMetadata::new(name, taken_at, image_cid);

    let client = pinata(config)?;
    let cid = client.pin_metadata(&metadata).await?;
    println!("{}", cid);
    println!("{}", client.gateway_url(&cid));
    Ok(())
}

/// Creator from the argument, or the last one browsed
fn resolve_creator(config: &Config, creator: Option<String>) -> Result<String> {
    creator
        .or_else(|| config.last_creator.clone())
        .ok_or_else(|| anyhow::anyhow!("No creator address given"))
}

async fn list_snapshots(mut config: Config, creator: Option<String>) -> Result<()> {
    let creator = resolve_creator(&config, creator)?;
    let pubkey: Pubkey = creator
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid creator address: {}", creator))?;

    let reader = DasClient::new(config.das_url()?)?;
    let storage = pinata(&config)?;
    let snapshots = browse_snapshots(&reader, &storage, &pubkey).await?;

    let cache = CacheManager::new(config.cache_dir()?)?;
    cache.save_snapshots(&creator, &snapshots)?;

    if snapshots.is_empty() {
        println!("No snapshots for {}", short_address(&creator));
    }
    for snapshot in &snapshots {
        println!(
            "{:<12} {}  {}",
            snapshot.name,
            short_address(&snapshot.asset_id),
            snapshot.image_url
        );
    }

    config.last_creator = Some(creator);
    config.save()?;
    Ok(())
}

fn show_cached(config: &Config, creator: Option<String>) -> Result<()> {
    let creator = resolve_creator(config, creator)?;
    let cache = CacheManager::new(config.cache_dir()?)?;

    match cache.load_snapshots(&creator)? {
        Some(cached) => {
            let stale = if cached.is_stale() { " (stale)" } else { "" };
            println!("Cached {}{}", cached.age_display(), stale);
            for snapshot in &cached.data {
                println!("{:<12} {}", snapshot.name, snapshot.image_url);
            }
        }
        None => println!("Nothing cached for {}", short_address(&creator)),
    }
    Ok(())
}
