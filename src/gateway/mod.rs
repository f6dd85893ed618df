//! Request/response boundary of the booking service.
//!
//! The `Book` procedure is served as `POST /bookamovie.Book/Book` with a JSON
//! body. Structural validation runs before the booking service is reached, and
//! service failures are reduced to one of three boundary codes.

pub mod messages;
pub mod status;
pub mod validation;

pub use messages::*;
pub use status::*;
pub use validation::*;

use crate::service::Booker;
use crate::{BookAMovieError, BookResponse, Metrics, Procedures, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct GatewayState {
    booker: Arc<dyn Booker>,
    metrics: Metrics,
}

impl GatewayState {
    pub fn new(booker: Arc<dyn Booker>, metrics: Metrics) -> Self {
        Self { booker, metrics }
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(Procedures::BOOK, post(book))
        .route(Procedures::HEALTH, get(health_check))
        .route(Procedures::METRICS, get(metrics_endpoint))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn book(
    State(state): State<GatewayState>,
    payload: std::result::Result<Json<BookRequest>, JsonRejection>,
) -> std::result::Result<Json<BookResponse>, Status> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("book", %request_id);

    async move {
        let started = Instant::now();
        let result = handle_book(&state, payload).await;
        state.metrics.record_request(started.elapsed());
        result
    }
    .instrument(span)
    .await
}

async fn handle_book(
    state: &GatewayState,
    payload: std::result::Result<Json<BookRequest>, JsonRejection>,
) -> std::result::Result<Json<BookResponse>, Status> {
    let Json(request) = payload.map_err(|rejection| {
        state.metrics.bookings_invalid.inc();
        warn!("Rejected undecodable Book request: {}", rejection);
        Status::invalid_argument("request body is not a valid Book request")
    })?;

    let request = validate_book_request(&request).map_err(|e| {
        state.metrics.bookings_invalid.inc();
        warn!("Rejected Book request: {}", e);
        Status::invalid_argument("required request arguments must be specified")
    })?;

    match state.booker.book(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            let status = Status::from(&e);
            match status.code {
                Code::AlreadyExists => info!("Book failed with {}: {}", status.code, e),
                _ => error!("Book failed with {}: {:?}", status.code, e),
            }
            Err(status)
        }
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bookamovie",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn metrics_endpoint(State(state): State<GatewayState>) -> std::result::Result<String, StatusCode> {
    state.metrics.export().map_err(|e| {
        error!("Failed to export metrics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// A gateway that is accepting connections on its own task.
pub struct GatewayServer {
    local_addr: SocketAddr,
    stop: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl GatewayServer {
    /// Start serving `router` on `listener` without blocking.
    ///
    /// The returned receiver yields the error that ended serving, if any.
    /// axum 0.7 retries failed accepts internally, so in practice `serve`
    /// only returns `Err` on listener faults it cannot recover from. When
    /// serving ends cleanly the sender is dropped and the receiver resolves
    /// to `Err(RecvError)`.
    pub fn start(listener: TcpListener, router: Router) -> Result<(Self, oneshot::Receiver<BookAMovieError>)> {
        let local_addr = listener.local_addr()?;
        let stop = Arc::new(Notify::new());
        let (fatal_tx, fatal_rx) = oneshot::channel();

        let signal = Arc::clone(&stop);
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await;

            if let Err(e) = served {
                let _ = fatal_tx.send(BookAMovieError::Io(e));
            }
        });

        info!("Gateway listening on {}", local_addr);

        Ok((
            Self {
                local_addr,
                stop,
                task: Mutex::new(Some(task)),
            },
            fatal_rx,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight calls to finish.
    pub async fn shutdown(&self) -> Result<()> {
        let Some(task) = self.task.lock().await.take() else {
            return Ok(());
        };

        self.stop.notify_one();
        task.await?;
        info!("Gateway on {} stopped", self.local_addr);
        Ok(())
    }
}
