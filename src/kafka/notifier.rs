use crate::notifier::Notifier;
use crate::{BookAMovieError, KafkaProducer, NotificationEvent, Result, ServiceConfig};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes booking notifications to a fixed topic and partition
pub struct KafkaNotifier {
    producer: KafkaProducer,
    topic: String,
    partition: i32,
    closed: AtomicBool,
}

impl KafkaNotifier {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let producer = KafkaProducer::new(config.to_kafka_config(), config.kafka.send_timeout())?;
        Ok(Self::with_producer(producer, &config.kafka.topic, config.kafka.partition))
    }

    pub fn with_producer(producer: KafkaProducer, topic: &str, partition: i32) -> Self {
        Self {
            producer,
            topic: topic.to_string(),
            partition,
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Notifier for KafkaNotifier {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BookAMovieError::ShutDown("kafka notifier"));
        }

        self.producer
            .send(&self.topic, Some(self.partition), event.ticket.as_str(), event)
            .await?;

        debug!("Published booking {} to {}/{}", event.ticket, self.topic, self.partition);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        info!("Flushing Kafka producer...");
        self.producer.flush(FLUSH_TIMEOUT).await?;
        info!("Kafka producer flushed successfully");
        Ok(())
    }
}
