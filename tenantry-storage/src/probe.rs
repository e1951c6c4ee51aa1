//! Tenant database liveness probe

use async_trait::async_trait;
use sqlx::{query_scalar, Connection, PgConnection};
use std::time::Duration;
use tenantry_core::ConnectionConfig;
use tenantry_interfaces::{ConnectionProbe, ProbeError};
use tracing::debug;

use crate::pg::pg_connect_options;

/// Opens a short-lived connection and runs `SELECT 1`
#[derive(Debug, Clone, Default)]
pub struct PostgresProbe;

impl PostgresProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectionProbe for PostgresProbe {
    async fn ping(&self, config: &ConnectionConfig) -> Result<i32, ProbeError> {
        let options = pg_connect_options(config).map_err(ProbeError::Connection)?;
        let timeout = Duration::from_secs(config.connect_timeout_secs.max(1));

        let mut conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| ProbeError::Connection(format!("connect timed out after {}s", timeout.as_secs())))?
            .map_err(|e| ProbeError::Connection(e.to_string()))?;

        let result: i32 = query_scalar("SELECT 1")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| ProbeError::Query(e.to_string()))?;

        if let Err(e) = conn.close().await {
            debug!(database = %config.database, "Error closing probe connection: {}", e);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_database() {
        let config = ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_secs: 1,
            ..Default::default()
        };
        let err = PostgresProbe::new().ping(&config).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connection(_)));
    }

    #[tokio::test]
    async fn test_invalid_ssl_mode() {
        let config = ConnectionConfig {
            ssl_mode: "bogus".to_string(),
            ..Default::default()
        };
        let err = PostgresProbe::new().ping(&config).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connection(_)));
    }
}
