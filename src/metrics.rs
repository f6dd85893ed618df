use prometheus::{
    Counter, Histogram, Registry, Opts, HistogramOpts,
    register_counter_with_registry, register_histogram_with_registry,
    Encoder, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;
use crate::Result;

/// Metrics collector for the booking service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Business metrics
    pub bookings_attempted: Counter,
    pub bookings_succeeded: Counter,
    pub bookings_rejected: Counter,
    pub bookings_invalid: Counter,
    pub bookings_failed: Counter,

    // Notifier metrics
    pub notifications_sent: Counter,
    pub notify_errors: Counter,
    pub notify_duration: Histogram,

    // Store metrics
    pub store_errors: Counter,
    pub reserve_duration: Histogram,

    // Gateway metrics
    pub request_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let bookings_attempted = register_counter_with_registry!(
            Opts::new("bookings_attempted_total", "Total number of booking requests reaching the service"),
            registry
        )?;

        let bookings_succeeded = register_counter_with_registry!(
            Opts::new("bookings_succeeded_total", "Total number of bookings committed and notified"),
            registry
        )?;

        let bookings_rejected = register_counter_with_registry!(
            Opts::new("bookings_rejected_total", "Total number of bookings rejected because the seat or screen was taken"),
            registry
        )?;

        let bookings_invalid = register_counter_with_registry!(
            Opts::new("bookings_invalid_total", "Total number of requests failing structural validation"),
            registry
        )?;

        let bookings_failed = register_counter_with_registry!(
            Opts::new("bookings_failed_total", "Total number of bookings ending in an internal failure"),
            registry
        )?;

        let notifications_sent = register_counter_with_registry!(
            Opts::new("notifications_sent_total", "Total number of booking notifications published"),
            registry
        )?;

        let notify_errors = register_counter_with_registry!(
            Opts::new("notify_errors_total", "Total number of failed notification publishes"),
            registry
        )?;

        let notify_duration = register_histogram_with_registry!(
            HistogramOpts::new("notify_duration_seconds", "Time spent publishing notifications")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            registry
        )?;

        let store_errors = register_counter_with_registry!(
            Opts::new("store_errors_total", "Total number of capacity store infrastructure failures"),
            registry
        )?;

        let reserve_duration = register_histogram_with_registry!(
            HistogramOpts::new("reserve_duration_seconds", "Time spent in the capacity store transaction")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            registry
        )?;

        let request_duration = register_histogram_with_registry!(
            HistogramOpts::new("request_duration_seconds", "Time spent processing Book calls")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
            registry
        )?;

        Ok(Self {
            registry,
            bookings_attempted,
            bookings_succeeded,
            bookings_rejected,
            bookings_invalid,
            bookings_failed,
            notifications_sent,
            notify_errors,
            notify_duration,
            store_errors,
            reserve_duration,
            request_duration,
        })
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn record_reserve(&self, duration: Duration, success: bool) {
        self.reserve_duration.observe(duration.as_secs_f64());
        if !success {
            self.store_errors.inc();
        }
    }

    pub fn record_notify(&self, duration: Duration, success: bool) {
        self.notify_duration.observe(duration.as_secs_f64());
        if success {
            self.notifications_sent.inc();
        } else {
            self.notify_errors.inc();
        }
    }

    pub fn record_request(&self, duration: Duration) {
        self.request_duration.observe(duration.as_secs_f64());
    }
}
