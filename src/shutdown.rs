use crate::gateway::GatewayServer;
use crate::notifier::Notifier;
use crate::storage::CapacityStore;
use crate::Result;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Trait for components that need graceful shutdown
#[async_trait::async_trait]
pub trait ShutdownComponent {
    async fn shutdown(&self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Graceful shutdown coordinator.
///
/// Components are stopped one after another in registration order. The
/// sequence runs at most once; later calls return immediately.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    components: Arc<Mutex<Vec<Box<dyn ShutdownComponent + Send + Sync>>>>,
    triggered: Arc<AtomicBool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            components: Arc::new(Mutex::new(Vec::new())),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a component for graceful shutdown
    pub async fn register_component(&self, component: Box<dyn ShutdownComponent + Send + Sync>) {
        let mut components = self.components.lock().await;
        info!("Registering component '{}' for graceful shutdown", component.name());
        components.push(component);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Run the shutdown sequence.
    ///
    /// Every component is attempted even if an earlier one fails; the first
    /// failure is returned once the sequence is over.
    pub async fn shutdown(&self) -> Result<()> {
        if self.triggered.swap(true, Ordering::AcqRel) {
            info!("Shutdown already in progress or done");
            return Ok(());
        }

        info!("Initiating graceful shutdown...");

        let components = self.components.lock().await;
        let mut first_error = None;

        for component in components.iter() {
            let component_name = component.name();
            info!("Shutting down component '{}'", component_name);
            match component.shutdown().await {
                Ok(()) => info!("Component '{}' shutdown successfully", component_name),
                Err(e) => {
                    error!("Component '{}' shutdown failed: {}", component_name, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            None => {
                info!("All components shutdown successfully");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }
}

/// Notifier shutdown component
pub struct NotifierShutdown {
    notifier: Arc<dyn Notifier>,
}

impl NotifierShutdown {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait::async_trait]
impl ShutdownComponent for NotifierShutdown {
    async fn shutdown(&self) -> Result<()> {
        self.notifier.shutdown().await
    }

    fn name(&self) -> &str {
        "notifier"
    }
}

/// Capacity store shutdown component
pub struct StoreShutdown {
    store: Arc<dyn CapacityStore>,
}

impl StoreShutdown {
    pub fn new(store: Arc<dyn CapacityStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ShutdownComponent for StoreShutdown {
    async fn shutdown(&self) -> Result<()> {
        self.store.shutdown().await;
        Ok(())
    }

    fn name(&self) -> &str {
        "capacity-store"
    }
}

/// Gateway shutdown component: drains in-flight calls
pub struct GatewayShutdown {
    gateway: Arc<GatewayServer>,
}

impl GatewayShutdown {
    pub fn new(gateway: Arc<GatewayServer>) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl ShutdownComponent for GatewayShutdown {
    async fn shutdown(&self) -> Result<()> {
        self.gateway.shutdown().await
    }

    fn name(&self) -> &str {
        "gateway"
    }
}

/// Wait for SIGINT or SIGTERM (Ctrl+C / Ctrl+Break on Windows)
pub async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
            }
        }
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c};

        let mut ctrl_c = ctrl_c()?;
        let mut ctrl_break = ctrl_break()?;

        tokio::select! {
            _ = ctrl_c.recv() => {
                info!("Received Ctrl+C, initiating graceful shutdown");
            }
            _ = ctrl_break.recv() => {
                info!("Received Ctrl+Break, initiating graceful shutdown");
            }
        }
    }

    Ok(())
}

/// Resolve when `primary` reports a signal.
///
/// If `primary` fails to listen, `fallback` is awaited instead. A failure of
/// both is logged and never resolves, so it cannot pass for a shutdown request.
pub async fn signal_with_fallback<P, F>(primary: P, fallback: F)
where
    P: Future<Output = Result<()>>,
    F: Future<Output = std::io::Result<()>>,
{
    let e = match primary.await {
        Ok(()) => return,
        Err(e) => e,
    };
    error!("Failed to listen for shutdown signals, falling back to Ctrl+C: {}", e);

    if let Err(e) = fallback.await {
        error!("Failed to listen for Ctrl+C, only a fatal error can stop the service now: {}", e);
        std::future::pending::<()>().await;
    }
}
