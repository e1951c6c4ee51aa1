//! Server startup and shutdown

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use tenantry_config::TenantryConfig;
use tokio::net::TcpListener;

use crate::{app::create_app, services::ServiceContainer};

pub struct Server {
    config: TenantryConfig,
    services: ServiceContainer,
}

impl Server {
    pub async fn new(config: TenantryConfig) -> Result<Self> {
        let services = ServiceContainer::new(&config).await?;
        Ok(Self { config, services })
    }

    pub fn build_app(&self) -> Router {
        create_app(self.services.app_context())
    }

    /// Load active tenants, serve until a shutdown signal, then release the
    /// connection registry
    pub async fn start(self) -> Result<()> {
        let report = self.services.registry.init().await;
        if !report.failed.is_empty() {
            tracing::warn!(
                failed = report.failed.len(),
                "Some tenant connections could not be registered at startup"
            );
        }

        let addr: SocketAddr = format!("{}:{}", self.config.server.bind_address, self.config.server.port)
            .parse()
            .context("Invalid bind address")?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tracing::info!("Tenantry server listening on {}", addr);
        self.log_config_summary();

        axum::serve(listener, self.build_app())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.services.registry.shutdown().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_config_summary(&self) {
        tracing::info!("Directory: {}", redact_url(&self.config.directory.url));
        tracing::info!(
            "Admin data store: {}:{}",
            self.config.admin.host,
            self.config.admin.port
        );
        tracing::info!("Collaborating service: {}", self.config.collaborator.base_url);
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}

/// Hide credentials embedded in a database URL
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
