//! Capacity store: the only place booking rows are created.
//!
//! Every backend must evaluate "is there room left for this session" and
//! "insert the booking" as one atomic step, so concurrent reservations for
//! the same session can never exceed the screen's seat count.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::{BookingRecord, Result, ScreenCapacity, SessionKey, Ticket};
use async_trait::async_trait;

/// Outcome of a conditional insert that did not fail for infrastructure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The row is durable and visible to later reads.
    Committed,
    /// Nothing was written: the session is full, the screen is unknown,
    /// or the seat is already taken.
    AlreadyFull,
}

#[async_trait]
pub trait CapacityStore: Send + Sync {
    /// Insert `record` only if its session still has room.
    ///
    /// `Err` is reserved for transaction, statement and connection faults.
    async fn reserve(&self, record: &BookingRecord) -> Result<ReserveOutcome>;

    /// Create or replace the seat count of a screen.
    async fn register_screen(&self, capacity: &ScreenCapacity) -> Result<()>;

    async fn find_booking(&self, ticket: &Ticket) -> Result<Option<BookingRecord>>;

    async fn count_bookings(&self, session: &SessionKey) -> Result<u64>;

    /// Release the underlying connection. Safe to call more than once.
    async fn shutdown(&self);
}
