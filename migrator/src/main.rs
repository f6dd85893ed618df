use anyhow::{bail, Context};
use bookamovie::logging::init_tracing;
use bookamovie::storage::{CapacityStore, SqliteStore};
use bookamovie::{LogMode, ScreenCapacity, ServiceConfig, StorageConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "migrator")]
#[command(about = "Apply the booking schema and register screens")]
struct Args {
    /// Config file path; its storage section is used unless --storage is given
    #[arg(short = 'c', long = "config", env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short = 's', long = "storage", env = "STORAGE")]
    storage: Option<String>,

    /// Screen number to register
    #[arg(long = "screen", requires_all = ["cinema", "location", "seats"])]
    screen: Option<u32>,

    /// Cinema name of the registered screen
    #[arg(long = "cinema")]
    cinema: Option<String>,

    /// Cinema location of the registered screen
    #[arg(long = "location")]
    location: Option<String>,

    /// Seat count of the registered screen
    #[arg(long = "seats")]
    seats: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut storage = match &args.config {
        Some(path) => {
            let config = ServiceConfig::load(path)
                .with_context(|| format!("failed to load config from {:?}", path))?;
            init_tracing(config.log_mode)?;
            config.storage
        }
        None => {
            init_tracing(LogMode::Local)?;
            StorageConfig::default()
        }
    };

    if let Some(address) = args.storage {
        storage.address = address;
    }

    if storage.address == ":memory:" {
        bail!("refusing to migrate an in-memory database");
    }

    if let Some(parent) = PathBuf::from(&storage.address).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {:?}", parent))?;
        }
    }

    let store = SqliteStore::connect(&storage).await?;
    store.migrate().await?;

    if let (Some(screen), Some(cinema), Some(location), Some(seats)) =
        (args.screen, args.cinema, args.location, args.seats)
    {
        store
            .register_screen(&ScreenCapacity {
                screen,
                cinema,
                location,
                seats,
            })
            .await?;
    }

    store.shutdown().await;
    info!("Migrations applied to {}", storage.address);
    Ok(())
}
