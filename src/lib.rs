pub mod app;
pub mod config;
pub mod config_parser;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod kafka;
pub mod logging;
pub mod metrics;
pub mod notifier;
pub mod service;
pub mod shutdown;
pub mod storage;
pub mod ticket;

pub use self::config::*;
pub use config_parser::*;
pub use domain::*;
pub use error::*;
pub use kafka::*;
pub use metrics::*;
