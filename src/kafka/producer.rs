use crate::{BookAMovieError, Result};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use serde::Serialize;
use std::time::Duration;

#[derive(Clone)]
pub struct KafkaProducer {
    producer: FutureProducer,
    send_timeout: Duration,
}

impl KafkaProducer {
    pub fn new(config: ClientConfig, send_timeout: Duration) -> Result<Self> {
        let producer: FutureProducer = config.create()?;
        Ok(Self {
            producer,
            send_timeout,
        })
    }

    /// Serialize `value` as JSON and wait for the broker to acknowledge it.
    pub async fn send<T>(&self, topic: &str, partition: Option<i32>, key: &str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_string(value)?;

        let mut record = FutureRecord::to(topic)
            .key(key)
            .payload(&payload);

        if let Some(partition) = partition {
            record = record.partition(partition);
        }

        self.producer
            .send(record, self.send_timeout)
            .await
            .map_err(|(kafka_err, _)| BookAMovieError::Kafka(kafka_err))?;

        Ok(())
    }

    pub async fn flush(&self, timeout: Duration) -> Result<()> {
        // librdkafka's flush blocks the calling thread
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(timeout)).await??;
        Ok(())
    }
}
