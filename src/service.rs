use crate::notifier::Notifier;
use crate::storage::{CapacityStore, ReserveOutcome};
use crate::ticket::{RandomTicketGenerator, TicketGenerator};
use crate::{
    BookAMovieError, BookResponse, BookingRecord, BookingRequest, Metrics, NotificationEvent,
    Ticket,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a booking did not complete
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("this order already exists")]
    AlreadyBooked,

    #[error("storage failure: {0}")]
    Storage(#[source] BookAMovieError),

    /// The booking is committed under `ticket` but the event was not delivered.
    #[error("notification for ticket {ticket} failed: {source}")]
    Notify {
        ticket: Ticket,
        #[source]
        source: BookAMovieError,
    },
}

/// Booking entry point as seen by the gateway
#[async_trait]
pub trait Booker: Send + Sync {
    async fn book(&self, request: BookingRequest) -> std::result::Result<BookResponse, BookingError>;
}

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn CapacityStore>,
    notifier: Arc<dyn Notifier>,
    tickets: Arc<dyn TicketGenerator>,
    metrics: Metrics,
}

impl BookingService {
    pub fn new(store: Arc<dyn CapacityStore>, notifier: Arc<dyn Notifier>, metrics: Metrics) -> Self {
        Self {
            store,
            notifier,
            tickets: Arc::new(RandomTicketGenerator),
            metrics,
        }
    }

    pub fn with_ticket_generator(mut self, tickets: Arc<dyn TicketGenerator>) -> Self {
        self.tickets = tickets;
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Read back a committed booking, e.g. after its notification failed.
    pub async fn find_booking(&self, ticket: &Ticket) -> crate::Result<Option<BookingRecord>> {
        self.store.find_booking(ticket).await
    }

    async fn reserve(&self, record: BookingRecord) -> crate::Result<ReserveOutcome> {
        let store = Arc::clone(&self.store);
        let started = Instant::now();

        // Driven on its own task: once the transaction starts it runs to
        // commit or rollback even if the caller goes away.
        let outcome = match tokio::spawn(async move { store.reserve(&record).await }).await {
            Ok(outcome) => outcome,
            Err(join_error) => Err(join_error.into()),
        };

        self.metrics.record_reserve(started.elapsed(), outcome.is_ok());
        outcome
    }
}

#[async_trait]
impl Booker for BookingService {
    async fn book(&self, request: BookingRequest) -> std::result::Result<BookResponse, BookingError> {
        self.metrics.bookings_attempted.inc();

        let ticket = self.tickets.generate();
        let record = BookingRecord::new(ticket.clone(), &request);

        match self.reserve(record).await {
            Ok(ReserveOutcome::Committed) => {}
            Ok(ReserveOutcome::AlreadyFull) => {
                self.metrics.bookings_rejected.inc();
                info!(
                    "Booking rejected for {} screen {} seat {}",
                    request.cinema.name, request.session.screen, request.session.seat
                );
                return Err(BookingError::AlreadyBooked);
            }
            Err(e) => {
                self.metrics.bookings_failed.inc();
                error!("Capacity store failed while booking: {}", e);
                return Err(BookingError::Storage(e));
            }
        }

        let event = NotificationEvent {
            ticket: ticket.clone(),
            data: request,
        };

        let started = Instant::now();
        let published = self.notifier.publish(&event).await;
        self.metrics.record_notify(started.elapsed(), published.is_ok());

        if let Err(e) = published {
            self.metrics.bookings_failed.inc();
            warn!("Booking {} committed but notification failed: {}", ticket, e);
            return Err(BookingError::Notify { ticket, source: e });
        }

        self.metrics.bookings_succeeded.inc();
        info!("Booking confirmed: {}", ticket);
        Ok(BookResponse::new(ticket))
    }
}
