use super::{CapacityStore, ReserveOutcome};
use crate::{
    session_label, BookAMovieError, BookingRecord, Result, ScreenCapacity, ScreenKey, SessionKey, Ticket,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// In-memory capacity store.
///
/// Each session's bookings live behind one dashmap entry; holding that entry
/// while counting and inserting serializes reservations for the same session
/// and leaves other sessions untouched.
#[derive(Default)]
pub struct MemoryStore {
    screens: DashMap<ScreenKey, u32>,
    sessions: DashMap<SessionKey, HashMap<u32, BookingRecord>>,
    tickets: DashMap<Ticket, BookingRecord>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_screens<I>(screens: I) -> Self
    where
        I: IntoIterator<Item = ScreenCapacity>,
    {
        let store = Self::new();
        for screen in screens {
            store.screens.insert(screen.key(), screen.seats);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(BookAMovieError::ShutDown("memory store"));
        }
        Ok(())
    }
}

#[async_trait]
impl CapacityStore for MemoryStore {
    async fn reserve(&self, record: &BookingRecord) -> Result<ReserveOutcome> {
        self.ensure_open()?;

        let capacity = match self.screens.get(&record.screen_key()) {
            Some(seats) => *seats,
            None => {
                warn!(
                    session = %session_label(record.screen, &record.cinema, &record.location),
                    "screen is not registered"
                );
                return Ok(ReserveOutcome::AlreadyFull);
            }
        };

        let mut bookings = self.sessions.entry(record.session_key()).or_default();

        if bookings.len() >= capacity as usize
            || bookings.contains_key(&record.seat)
            || self.tickets.contains_key(&record.ticket)
        {
            warn!(
                session = %session_label(record.screen, &record.cinema, &record.location),
                seat = record.seat,
                "seat already booked or screen is full"
            );
            return Ok(ReserveOutcome::AlreadyFull);
        }

        bookings.insert(record.seat, record.clone());
        self.tickets.insert(record.ticket.clone(), record.clone());

        Ok(ReserveOutcome::Committed)
    }

    async fn register_screen(&self, capacity: &ScreenCapacity) -> Result<()> {
        self.ensure_open()?;
        self.screens.insert(capacity.key(), capacity.seats);
        Ok(())
    }

    async fn find_booking(&self, ticket: &Ticket) -> Result<Option<BookingRecord>> {
        self.ensure_open()?;
        Ok(self.tickets.get(ticket).map(|entry| entry.value().clone()))
    }

    async fn count_bookings(&self, session: &SessionKey) -> Result<u64> {
        self.ensure_open()?;
        Ok(self
            .sessions
            .get(session)
            .map(|bookings| bookings.len() as u64)
            .unwrap_or(0))
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
