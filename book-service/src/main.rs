use anyhow::Context;
use bookamovie::app::App;
use bookamovie::logging::init_tracing;
use bookamovie::{merge_producer_properties, ServiceConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "book-service")]
#[command(about = "Movie ticket booking service")]
struct Args {
    /// Config file path (YAML, TOML or JSON)
    #[arg(short = 'c', long = "config", env = "CONFIG_PATH", default_value = "config/local.yaml")]
    config: PathBuf,

    /// Kafka producer properties file merged over the config file
    #[arg(long = "producer-config")]
    producer_config: Option<PathBuf>,

    /// Override the gateway listen address
    #[arg(short = 'a', long = "address")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = ServiceConfig::load(&args.config)
        .with_context(|| format!("failed to load config from {:?}", args.config))?;

    if let Some(producer_config_path) = &args.producer_config {
        config = merge_producer_properties(config, producer_config_path)
            .with_context(|| format!("failed to load producer config from {:?}", producer_config_path))?;
    }

    if let Some(address) = args.address {
        config.book.address = address;
        config.validate()?;
    }

    init_tracing(config.log_mode)?;

    info!("Starting Book Service on {}", config.book.address);
    info!("Config file: {:?}", args.config);
    info!("Storage: {}", config.storage.address);
    info!("Kafka: {} topic {} partition {}", config.kafka.bootstrap_servers, config.kafka.topic, config.kafka.partition);

    let app = App::new(config).await.context("failed to start booking service")?;
    app.run().await?;

    info!("Book Service stopped");
    Ok(())
}
