use crate::{BookAMovieError, NotificationEvent, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Publish-only link to the external event stream.
///
/// Delivery is not part of the booking transaction: a failed publish
/// leaves the committed booking in place.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: &NotificationEvent) -> Result<()>;

    /// Flush and release the publish channel. Safe to call more than once.
    async fn shutdown(&self) -> Result<()>;
}

/// Keeps every published event in memory
#[derive(Default)]
pub struct MemoryNotifier {
    events: Mutex<Vec<NotificationEvent>>,
    closed: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        if self.is_closed() {
            return Err(BookAMovieError::ShutDown("memory notifier"));
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// Accepts and drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn publish(&self, _event: &NotificationEvent) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
