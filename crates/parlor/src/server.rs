//! `ParlorServer` builder and serve loop.
//!
//! Ties the layers together: it spawns the directory actor, binds the HTTP
//! listener for the gateway, and optionally starts the system monitor.

use std::time::Duration;

use parlor_lobby::Directory;
use parlor_monitor::{spawn_monitor, MonitorConfig, MonitorHandle};
use tokio::net::TcpListener;

use crate::gateway;
use crate::ParlorError;

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,no_run
/// use parlor::ParlorServer;
///
/// # async fn run() -> Result<(), parlor::ParlorError> {
/// let server = ParlorServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
    request_timeout: Duration,
    monitor: Option<MonitorConfig>,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(10),
            monitor: None,
        }
    }

    /// Sets the address to bind the gateway to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the gateway's bounded wait for core replies.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables the periodic system monitor.
    pub fn monitor(mut self, config: MonitorConfig) -> Self {
        self.monitor = Some(config);
        self
    }

    /// Spawns the directory, binds the listener, and starts the monitor if
    /// one was configured.
    pub async fn build(self) -> Result<ParlorServer, ParlorError> {
        let directory = Directory::spawn();
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let router = gateway::router(directory, self.request_timeout);
        let monitor = self.monitor.map(spawn_monitor);

        Ok(ParlorServer {
            listener,
            router,
            monitor,
        })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Parlor server. Call [`run()`](Self::run) to serve requests.
pub struct ParlorServer {
    listener: TcpListener,
    router: axum::Router,
    monitor: Option<MonitorHandle>,
}

impl ParlorServer {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// Returns the local address the gateway is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves the gateway until the process is terminated.
    pub async fn run(self) -> Result<(), ParlorError> {
        tracing::info!("parlor server running");

        let result = axum::serve(self.listener, self.router).await;

        if let Some(monitor) = self.monitor {
            monitor.shutdown().await;
        }

        result.map_err(ParlorError::from)
    }
}
