#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bookamovie::notifier::Notifier;
use bookamovie::storage::{CapacityStore, MemoryStore, ReserveOutcome, SqliteStore};
use bookamovie::{
    BookAMovieError, BookingRecord, BookingRequest, Cinema, Movie, NotificationEvent, Procedures,
    Result, ScreenCapacity, Session, SessionKey, StorageConfig, Ticket,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const CINEMA: &str = "Grand";
pub const LOCATION: &str = "Downtown";
pub const MOVIE: &str = "Dune";
pub const SCREEN: u32 = 1;

pub fn session_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 20, 0, 0).unwrap()
}

pub fn grand_screen(seats: u32) -> ScreenCapacity {
    ScreenCapacity {
        screen: SCREEN,
        cinema: CINEMA.to_string(),
        location: LOCATION.to_string(),
        seats,
    }
}

pub fn session_key() -> SessionKey {
    SessionKey {
        screen: SCREEN,
        cinema: CINEMA.to_string(),
        location: LOCATION.to_string(),
        date: session_date(),
    }
}

pub fn booking_request(seat: u32) -> BookingRequest {
    BookingRequest {
        cinema: Cinema {
            name: CINEMA.to_string(),
            location: LOCATION.to_string(),
        },
        movie: Movie {
            title: MOVIE.to_string(),
        },
        session: Session {
            screen: SCREEN,
            seat,
            date: session_date(),
        },
    }
}

pub fn booking_record(ticket: &str, seat: u32) -> BookingRecord {
    BookingRecord::new(Ticket::new(ticket), &booking_request(seat))
}

pub fn book_body(seat: u32) -> Value {
    json!({
        "cinema": { "name": CINEMA, "location": LOCATION },
        "movie": { "title": MOVIE },
        "session": { "screen": SCREEN, "seat": seat, "date": "2025-01-01T20:00:00Z" }
    })
}

pub async fn sqlite_store(dir: &TempDir) -> SqliteStore {
    let config = StorageConfig {
        address: dir.path().join("bookamovie.db").to_string_lossy().to_string(),
        ..StorageConfig::default()
    };
    let store = SqliteStore::connect(&config).await.unwrap();
    store.migrate().await.unwrap();
    store
}

pub async fn post_book(router: &Router, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(Procedures::BOOK)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

/// Memory store that counts every call reaching it
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn with_screen(seats: u32) -> Self {
        Self {
            inner: MemoryStore::with_screens([grand_screen(seats)]),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapacityStore for CountingStore {
    async fn reserve(&self, record: &BookingRecord) -> Result<ReserveOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reserve(record).await
    }

    async fn register_screen(&self, capacity: &ScreenCapacity) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.register_screen(capacity).await
    }

    async fn find_booking(&self, ticket: &Ticket) -> Result<Option<BookingRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_booking(ticket).await
    }

    async fn count_bookings(&self, session: &SessionKey) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.count_bookings(session).await
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await
    }
}

/// Memory store whose reservations stall before touching the data
pub struct SlowStore {
    pub inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    pub fn with_screen(seats: u32, delay: Duration) -> Self {
        Self {
            inner: MemoryStore::with_screens([grand_screen(seats)]),
            delay,
        }
    }
}

#[async_trait]
impl CapacityStore for SlowStore {
    async fn reserve(&self, record: &BookingRecord) -> Result<ReserveOutcome> {
        tokio::time::sleep(self.delay).await;
        self.inner.reserve(record).await
    }

    async fn register_screen(&self, capacity: &ScreenCapacity) -> Result<()> {
        self.inner.register_screen(capacity).await
    }

    async fn find_booking(&self, ticket: &Ticket) -> Result<Option<BookingRecord>> {
        self.inner.find_booking(ticket).await
    }

    async fn count_bookings(&self, session: &SessionKey) -> Result<u64> {
        self.inner.count_bookings(session).await
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await
    }
}

/// Store whose connection is always broken
pub struct BrokenStore;

#[async_trait]
impl CapacityStore for BrokenStore {
    async fn reserve(&self, _record: &BookingRecord) -> Result<ReserveOutcome> {
        Err(BookAMovieError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn register_screen(&self, _capacity: &ScreenCapacity) -> Result<()> {
        Err(BookAMovieError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_booking(&self, _ticket: &Ticket) -> Result<Option<BookingRecord>> {
        Err(BookAMovieError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn count_bookings(&self, _session: &SessionKey) -> Result<u64> {
        Err(BookAMovieError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn shutdown(&self) {}
}

/// Notifier whose broker never answers
pub struct BrokenNotifier;

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn publish(&self, _event: &NotificationEvent) -> Result<()> {
        Err(BookAMovieError::InvalidArgument(
            "broker unreachable at kafka-0:9092".to_string(),
        ))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
