use crate::{BookAMovieError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Prefix of environment variables layered over the config file,
/// e.g. `BOOKAMOVIE__KAFKA__TOPIC`.
pub const ENV_PREFIX: &str = "BOOKAMOVIE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub address: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:44044".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the SQLite database file, or `:memory:`.
    pub address: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            address: "storage/bookamovie.db".to_string(),
            max_connections: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StorageConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub partition: i32,
    pub send_timeout_ms: u64,
    pub security_protocol: Option<String>,
    pub sasl_mechanism: Option<String>,
    pub sasl_username: Option<String>,
    pub sasl_password: Option<String>,
    pub ssl_ca_location: Option<String>,
    pub additional_properties: HashMap<String, String>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            topic: "bookamovie.bookings".to_string(),
            partition: 0,
            send_timeout_ms: 10_000,
            security_protocol: None,
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
            ssl_ca_location: None,
            additional_properties: HashMap::new(),
        }
    }
}

impl KafkaConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Discard all log output.
    Silent,
    /// Human readable output with debug level.
    #[default]
    Local,
    /// Text output with debug level.
    Dev,
    /// JSON output with info level.
    Prod,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub book: GatewayConfig,
    pub storage: StorageConfig,
    pub kafka: KafkaConfig,
    pub log_mode: LogMode,
}

impl ServiceConfig {
    /// Load the configuration file at `path` (format picked from the extension),
    /// layered with `BOOKAMOVIE__*` environment variables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: ServiceConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.book.address.trim().is_empty() {
            return Err(BookAMovieError::InvalidArgument(
                "book.address must be specified".to_string(),
            ));
        }
        if self.storage.address.trim().is_empty() {
            return Err(BookAMovieError::InvalidArgument(
                "storage.address must be specified".to_string(),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(BookAMovieError::InvalidArgument(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }
        if self.kafka.bootstrap_servers.trim().is_empty() {
            return Err(BookAMovieError::InvalidArgument(
                "kafka.bootstrap_servers must be specified".to_string(),
            ));
        }
        if self.kafka.topic.trim().is_empty() {
            return Err(BookAMovieError::InvalidArgument(
                "kafka.topic must be specified".to_string(),
            ));
        }
        if self.kafka.partition < 0 {
            return Err(BookAMovieError::InvalidArgument(format!(
                "kafka.partition must not be negative, got {}",
                self.kafka.partition
            )));
        }
        Ok(())
    }

    pub fn to_kafka_config(&self) -> rdkafka::ClientConfig {
        let mut config = rdkafka::ClientConfig::new();

        config.set("bootstrap.servers", &self.kafka.bootstrap_servers);
        config.set("client.id", "bookamovie");
        config.set("message.timeout.ms", self.kafka.send_timeout_ms.to_string());

        if let Some(security_protocol) = &self.kafka.security_protocol {
            config.set("security.protocol", security_protocol);
        }

        if let Some(sasl_mechanism) = &self.kafka.sasl_mechanism {
            config.set("sasl.mechanism", sasl_mechanism);
        }

        if let Some(sasl_username) = &self.kafka.sasl_username {
            config.set("sasl.username", sasl_username);
        }

        if let Some(sasl_password) = &self.kafka.sasl_password {
            config.set("sasl.password", sasl_password);
        }

        if let Some(ssl_ca_location) = &self.kafka.ssl_ca_location {
            config.set("ssl.ca.location", ssl_ca_location);
        }

        // Add additional properties
        for (key, value) in &self.kafka.additional_properties {
            config.set(key, value);
        }

        config
    }
}
