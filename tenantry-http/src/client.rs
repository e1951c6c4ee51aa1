//! Collaborating service client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tenantry_config::CollaboratorConfig;
use tenantry_core::RemoteCallFailure;
use tenantry_interfaces::{RemoteOrchestrator, TemplateDistribution};
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::HttpError;

pub const INTERNAL_TOKEN_HEADER: &str = "X-Internal-Token";
pub const MIGRATE_TENANT_PATH: &str = "api/v1/internal/migrate-tenant/";
pub const DISTRIBUTE_TEMPLATES_PATH: &str = "api/v1/internal/distribute-templates/";

/// Longest response body kept in a failure
const MAX_BODY_CHARS: usize = 1000;

#[derive(Serialize)]
struct MigrateRequest<'a> {
    tenant_slug: &'a str,
    connection_name: &'a str,
}

#[derive(Serialize)]
struct DistributeRequest<'a> {
    tenant_slug: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    framework_ids: Option<Vec<i64>>,
}

/// [`RemoteOrchestrator`] over HTTP
#[derive(Clone)]
pub struct CollaboratorClient {
    client: Client,
    base_url: Url,
    internal_token: String,
    migrate_timeout: Duration,
    templates_timeout: Duration,
}

impl std::fmt::Debug for CollaboratorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaboratorClient")
            .field("base_url", &self.base_url.as_str())
            .field("migrate_timeout", &self.migrate_timeout)
            .field("templates_timeout", &self.templates_timeout)
            .finish_non_exhaustive()
    }
}

impl CollaboratorClient {
    pub fn new(config: &CollaboratorConfig, internal_token: impl Into<String>) -> Result<Self, HttpError> {
        let internal_token = internal_token.into();
        if internal_token.trim().is_empty() {
            return Err(HttpError::ConfigError("internal token cannot be empty".to_string()));
        }

        // a trailing slash keeps Url::join from replacing the last path segment
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(config.user_agent.as_str())
            .build()?;

        debug!(
            base_url = %base_url,
            migrate_timeout = config.migrate_timeout.as_secs(),
            templates_timeout = config.templates_timeout.as_secs(),
            "Created collaborator client"
        );

        Ok(Self {
            client,
            base_url,
            internal_token,
            migrate_timeout: config.migrate_timeout,
            templates_timeout: config.templates_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteCallFailure> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteCallFailure::Transport(format!("invalid endpoint {}: {}", path, e)))
    }

    /// POST `body` and return the response text when the status is 200
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<String, RemoteCallFailure> {
        let url = self.endpoint(path)?;

        let response = self
            .client
            .post(url.clone())
            .header(INTERNAL_TOKEN_HEADER, &self.internal_token)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_failure(e, timeout))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_failure(e, timeout))?;

        if status != StatusCode::OK {
            return Err(RemoteCallFailure::Status {
                status: status.as_u16(),
                body: truncate(&text),
            });
        }

        Ok(text)
    }
}

fn transport_failure(err: reqwest::Error, timeout: Duration) -> RemoteCallFailure {
    if err.is_timeout() {
        RemoteCallFailure::Timeout(timeout.as_secs())
    } else {
        RemoteCallFailure::Transport(err.to_string())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_BODY_CHARS).collect()
}

#[async_trait]
impl RemoteOrchestrator for CollaboratorClient {
    async fn run_migrations(&self, tenant_slug: &str, connection_name: &str) -> Result<(), RemoteCallFailure> {
        let request = MigrateRequest {
            tenant_slug,
            connection_name,
        };

        match self.post(MIGRATE_TENANT_PATH, &request, self.migrate_timeout).await {
            Ok(_) => {
                info!(tenant_slug, connection_name, "Tenant migrations completed");
                Ok(())
            }
            Err(failure) => {
                warn!(tenant_slug, connection_name, "Tenant migrations failed: {}", failure);
                Err(failure)
            }
        }
    }

    async fn seed_templates(
        &self,
        tenant_slug: &str,
        framework_ids: Option<Vec<i64>>,
    ) -> Result<TemplateDistribution, RemoteCallFailure> {
        let request = DistributeRequest {
            tenant_slug,
            framework_ids: framework_ids.filter(|ids| !ids.is_empty()),
        };

        let text = match self.post(DISTRIBUTE_TEMPLATES_PATH, &request, self.templates_timeout).await {
            Ok(text) => text,
            Err(failure) => {
                warn!(tenant_slug, "Template distribution failed: {}", failure);
                return Err(failure);
            }
        };

        let distribution: TemplateDistribution = serde_json::from_str(&text).map_err(|e| {
            warn!(tenant_slug, "Template distribution returned an unreadable body: {}", e);
            RemoteCallFailure::InvalidBody(e.to_string())
        })?;

        info!(
            tenant_slug,
            success = distribution.success,
            frameworks_copied = distribution.frameworks_copied,
            "Template distribution finished"
        );
        Ok(distribution)
    }
}
