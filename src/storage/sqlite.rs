use super::{CapacityStore, ReserveOutcome};
use crate::{
    session_label, BookAMovieError, BookingRecord, Result, ScreenCapacity, SessionKey,
    StorageConfig, Ticket,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

const MEMORY_ADDRESS: &str = ":memory:";

// The count and the capacity are read by the same statement that writes the
// row, so the comparison and the insert happen under one write lock.
const RESERVE_SQL: &str = r#"
    INSERT INTO bookings (id, movie, screen, seat, date, cinema, location)
    SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7
    WHERE (
        SELECT COUNT(*) FROM bookings
        WHERE screen = ?3 AND date = ?5 AND cinema = ?6 AND location = ?7
    ) < (
        SELECT seats FROM screens
        WHERE screen = ?3 AND cinema = ?6 AND location = ?7
    )
"#;

const REGISTER_SCREEN_SQL: &str = r#"
    INSERT INTO screens (screen, cinema, location, seats)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT (screen, cinema, location) DO UPDATE SET seats = excluded.seats
"#;

#[derive(FromRow)]
struct BookingRow {
    id: String,
    movie: String,
    screen: i64,
    seat: i64,
    date: DateTime<Utc>,
    cinema: String,
    location: String,
}

impl TryFrom<BookingRow> for BookingRecord {
    type Error = BookAMovieError;

    fn try_from(row: BookingRow) -> Result<Self> {
        let screen = u32::try_from(row.screen).map_err(|_| {
            BookAMovieError::InvalidArgument(format!("stored screen out of range: {}", row.screen))
        })?;
        let seat = u32::try_from(row.seat).map_err(|_| {
            BookAMovieError::InvalidArgument(format!("stored seat out of range: {}", row.seat))
        })?;

        Ok(Self {
            ticket: Ticket::new(row.id),
            movie: row.movie,
            screen,
            seat,
            date: row.date,
            cinema: row.cinema,
            location: row.location,
        })
    }
}

/// SQLite-backed capacity store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let in_memory = config.address == MEMORY_ADDRESS;

        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.address)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };
        let options = options.busy_timeout(config.busy_timeout());

        // An in-memory database lives and dies with its single connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        info!("Connected to SQLite storage at {}", config.address);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Storage migrations applied");
        Ok(())
    }
}

#[async_trait]
impl CapacityStore for SqliteStore {
    async fn reserve(&self, record: &BookingRecord) -> Result<ReserveOutcome> {
        const OP: &str = "reserve";

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!(op = OP, error = %e, "can't start a transaction");
            BookAMovieError::Database(e)
        })?;

        let executed = sqlx::query(RESERVE_SQL)
            .bind(record.ticket.as_str())
            .bind(&record.movie)
            .bind(record.screen)
            .bind(record.seat)
            .bind(record.date)
            .bind(&record.cinema)
            .bind(&record.location)
            .execute(&mut *tx)
            .await;

        let affected = match executed {
            Ok(result) => result.rows_affected(),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                warn!(
                    op = OP,
                    session = %session_label(record.screen, &record.cinema, &record.location),
                    seat = record.seat,
                    "seat already booked"
                );
                tx.rollback().await?;
                return Ok(ReserveOutcome::AlreadyFull);
            }
            Err(e) => {
                error!(op = OP, error = %e, "can't execute a statement");
                return Err(BookAMovieError::Database(e));
            }
        };

        if affected == 0 {
            warn!(
                op = OP,
                session = %session_label(record.screen, &record.cinema, &record.location),
                date = %record.date,
                "screen is full or not registered"
            );
            tx.rollback().await?;
            return Ok(ReserveOutcome::AlreadyFull);
        }

        tx.commit().await.map_err(|e| {
            error!(op = OP, error = %e, "can't commit a transaction");
            BookAMovieError::Database(e)
        })?;

        debug!(op = OP, ticket = %record.ticket, "booking committed");
        Ok(ReserveOutcome::Committed)
    }

    async fn register_screen(&self, capacity: &ScreenCapacity) -> Result<()> {
        if capacity.screen == 0 {
            return Err(BookAMovieError::InvalidArgument(
                "screen must be a positive number".to_string(),
            ));
        }

        sqlx::query(REGISTER_SCREEN_SQL)
            .bind(capacity.screen)
            .bind(&capacity.cinema)
            .bind(&capacity.location)
            .bind(capacity.seats)
            .execute(&self.pool)
            .await?;

        info!(
            "Registered screen {} with {} seats",
            session_label(capacity.screen, &capacity.cinema, &capacity.location),
            capacity.seats
        );
        Ok(())
    }

    async fn find_booking(&self, ticket: &Ticket) -> Result<Option<BookingRecord>> {
        let row: Option<BookingRow> = sqlx::query_as(
            "SELECT id, movie, screen, seat, date, cinema, location FROM bookings WHERE id = ?1",
        )
        .bind(ticket.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookingRecord::try_from).transpose()
    }

    async fn count_bookings(&self, session: &SessionKey) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE screen = ?1 AND date = ?2 AND cinema = ?3 AND location = ?4",
        )
        .bind(session.screen)
        .bind(session.date)
        .bind(&session.cinema)
        .bind(&session.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn shutdown(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("SQLite storage closed");
        }
    }
}
