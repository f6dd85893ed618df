use crate::{BookAMovieError, KafkaConfig, Result, ServiceConfig};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a Java properties file into a key/value map
pub fn read_properties_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let file = File::open(&path).map_err(|e| {
        BookAMovieError::InvalidArgument(format!("Failed to open properties file {:?}: {}", path.as_ref(), e))
    })?;

    let reader = BufReader::new(file);
    java_properties::read(reader)
        .map_err(|e| BookAMovieError::InvalidArgument(format!("Failed to parse properties: {}", e)))
}

/// Apply Kafka client properties on top of an existing Kafka section.
///
/// Well-known connection keys land in their typed fields, everything else
/// is passed through to librdkafka untouched.
pub fn apply_kafka_properties(kafka: &mut KafkaConfig, properties: HashMap<String, String>) -> Result<()> {
    for (key, value) in properties {
        match key.as_str() {
            "bootstrap.servers" => kafka.bootstrap_servers = value,
            "security.protocol" => kafka.security_protocol = Some(value),
            "sasl.mechanism" => kafka.sasl_mechanism = Some(value),
            "sasl.username" => kafka.sasl_username = Some(value),
            "sasl.password" => kafka.sasl_password = Some(value),
            "ssl.ca.location" => kafka.ssl_ca_location = Some(value),
            "message.timeout.ms" => {
                kafka.send_timeout_ms = value.trim().parse().map_err(|_| {
                    BookAMovieError::InvalidArgument(format!(
                        "message.timeout.ms must be a number of milliseconds, got {:?}",
                        value
                    ))
                })?;
            }
            _ => {
                kafka.additional_properties.insert(key, value);
            }
        }
    }
    Ok(())
}

/// Parse a producer properties file and merge it into the service config
pub fn merge_producer_properties<P: AsRef<Path>>(mut config: ServiceConfig, path: P) -> Result<ServiceConfig> {
    let properties = read_properties_file(path)?;
    apply_kafka_properties(&mut config.kafka, properties)?;
    config.validate()?;
    Ok(config)
}
