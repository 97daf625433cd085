//! `parlord` — the Parlor lobby service daemon.

use parlor::{MonitorConfig, ParlorError, ParlorServer};

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let server = ParlorServer::builder()
        .bind("127.0.0.1:8080")
        .monitor(MonitorConfig::default())
        .build()
        .await?;

    tracing::info!(addr = %server.local_addr()?, "parlord listening");
    server.run().await
}
