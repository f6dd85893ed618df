use crate::gateway::{self, GatewayServer, GatewayState};
use crate::notifier::Notifier;
use crate::service::BookingService;
use crate::shutdown::{
    signal_with_fallback, wait_for_signal, GatewayShutdown, NotifierShutdown, ShutdownCoordinator,
    StoreShutdown,
};
use crate::storage::{CapacityStore, SqliteStore};
use crate::{KafkaNotifier, Metrics, Result, ServiceConfig};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// The wired-up booking service: configuration, collaborators and gateway.
pub struct App {
    config: Arc<ServiceConfig>,
    store: Arc<dyn CapacityStore>,
    notifier: Arc<dyn Notifier>,
    service: BookingService,
}

impl App {
    /// Connect the SQLite store (applying migrations) and the Kafka notifier.
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let store = SqliteStore::connect(&config.storage).await?;
        store.migrate().await?;

        let notifier = KafkaNotifier::new(&config)?;

        Self::from_parts(config, Arc::new(store), Arc::new(notifier))
    }

    pub fn from_parts(
        config: ServiceConfig,
        store: Arc<dyn CapacityStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let metrics = Metrics::new()?;
        let service = BookingService::new(Arc::clone(&store), Arc::clone(&notifier), metrics);

        Ok(Self {
            config: Arc::new(config),
            store,
            notifier,
            service,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn service(&self) -> &BookingService {
        &self.service
    }

    pub fn router(&self) -> Router {
        let state = GatewayState::new(Arc::new(self.service.clone()), self.service.metrics().clone());
        gateway::router(state)
    }

    /// Serve until SIGINT/SIGTERM or a fatal gateway error, then shut down.
    pub async fn run(self) -> Result<()> {
        self.run_until(|_| signal_with_fallback(wait_for_signal(), tokio::signal::ctrl_c()))
            .await
    }

    /// Like [`App::run`], with the shutdown trigger supplied by the caller.
    ///
    /// `signal` receives the bound address once the gateway is serving.
    pub async fn run_until<F, Fut>(self, signal: F) -> Result<()>
    where
        F: FnOnce(SocketAddr) -> Fut,
        Fut: Future<Output = ()>,
    {
        let listener = TcpListener::bind(&self.config.book.address).await?;
        let router = self.router();
        let (gateway, mut fatal) = GatewayServer::start(listener, router)?;
        let gateway = Arc::new(gateway);

        // Order matters: notifier, then store, then the gateway drain.
        let coordinator = ShutdownCoordinator::new();
        coordinator
            .register_component(Box::new(NotifierShutdown::new(Arc::clone(&self.notifier))))
            .await;
        coordinator
            .register_component(Box::new(StoreShutdown::new(Arc::clone(&self.store))))
            .await;
        coordinator
            .register_component(Box::new(GatewayShutdown::new(Arc::clone(&gateway))))
            .await;

        info!("Booking service started on {}", gateway.local_addr());

        let run_error = tokio::select! {
            _ = signal(gateway.local_addr()) => {
                info!("attempting to shut down gracefully");
                None
            }
            fatal_error = &mut fatal => match fatal_error {
                Ok(e) => {
                    error!("error happened while running, attempting to shut down gracefully: {}", e);
                    Some(e)
                }
                Err(_) => {
                    warn!("gateway stopped unexpectedly, attempting to shut down gracefully");
                    None
                }
            },
        };

        let shutdown_result = coordinator.shutdown().await;
        info!("shut down gracefully");

        match run_error {
            Some(e) => Err(e),
            None => shutdown_result,
        }
    }
}
