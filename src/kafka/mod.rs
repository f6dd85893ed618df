pub mod notifier;
pub mod producer;

pub use notifier::KafkaNotifier;
pub use producer::KafkaProducer;
