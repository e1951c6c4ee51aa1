//! PostgreSQL database provisioner
//!
//! Reconciles a tenant role and database on the administrative server:
//!
//! 1. role: `CREATE ROLE` when missing, otherwise `ALTER ROLE` to reset the
//!    password
//! 2. database: `CREATE DATABASE ... OWNER` when missing, `ALTER DATABASE
//!    ... OWNER TO` when owned by someone else
//! 3. `GRANT ALL PRIVILEGES ON DATABASE` every time
//!
//! Identifiers and the password are quoted by the server (`quote_ident`,
//! `quote_literal`) before they are spliced into DDL, which cannot take bind
//! parameters. Each statement runs on the pool outside any transaction since
//! `CREATE DATABASE` refuses to run inside one.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{query, query_scalar};
use std::time::Duration;
use tenantry_config::AdminDatabaseConfig;
use tenantry_core::{DatabaseCredentials, ProvisioningError};
use tenantry_interfaces::DatabaseProvisioner;
use tracing::{debug, info};

use crate::pg::{base_connection_config, pg_connect_options};

/// What currently exists on the server for one tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedState {
    pub role_exists: bool,
    /// Owner of the database, `None` when the database does not exist
    pub database_owner: Option<String>,
}

/// Server-quoted forms of the names and password
#[derive(Clone)]
pub struct QuotedNames {
    pub role: String,
    pub database: String,
    pub password: String,
}

/// One administrative statement and the step it belongs to
#[derive(Clone, PartialEq, Eq)]
pub struct AdminStatement {
    pub step: &'static str,
    pub sql: String,
}

// sql carries the quoted password
impl std::fmt::Debug for AdminStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminStatement").field("step", &self.step).finish_non_exhaustive()
    }
}

/// Statements that bring the server from `observed` to the expected state
pub fn plan_statements(observed: &ObservedState, expected_owner: &str, quoted: &QuotedNames) -> Vec<AdminStatement> {
    let mut statements = Vec::with_capacity(3);

    statements.push(if observed.role_exists {
        AdminStatement {
            step: "alter_role",
            sql: format!("ALTER ROLE {} WITH LOGIN PASSWORD {}", quoted.role, quoted.password),
        }
    } else {
        AdminStatement {
            step: "create_role",
            sql: format!("CREATE ROLE {} WITH LOGIN PASSWORD {}", quoted.role, quoted.password),
        }
    });

    match observed.database_owner.as_deref() {
        None => statements.push(AdminStatement {
            step: "create_database",
            sql: format!("CREATE DATABASE {} OWNER {}", quoted.database, quoted.role),
        }),
        Some(owner) if owner != expected_owner => statements.push(AdminStatement {
            step: "alter_database_owner",
            sql: format!("ALTER DATABASE {} OWNER TO {}", quoted.database, quoted.role),
        }),
        Some(_) => {}
    }

    statements.push(AdminStatement {
        step: "grant_privileges",
        sql: format!("GRANT ALL PRIVILEGES ON DATABASE {} TO {}", quoted.database, quoted.role),
    });

    statements
}

/// [`DatabaseProvisioner`] backed by a PostgreSQL administrative connection
#[derive(Clone)]
pub struct PostgresProvisioner {
    pool: PgPool,
}

impl PostgresProvisioner {
    /// Build a provisioner whose pool connects on first use
    pub fn connect_lazy(config: &AdminDatabaseConfig) -> Result<Self, ProvisioningError> {
        let options = pg_connect_options(&base_connection_config(config)).map_err(ProvisioningError::Connection)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .connect_lazy_with(options);

        info!(
            host = %config.host,
            port = config.port,
            database = %config.maintenance_database,
            "Administrative database pool configured"
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn quote_ident(&self, identifier: &str) -> Result<String, ProvisioningError> {
        query_scalar("SELECT quote_ident($1)")
            .bind(identifier)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| quoting_error(identifier, e))
    }

    async fn quote_literal(&self, value: &str) -> Result<String, ProvisioningError> {
        query_scalar("SELECT quote_literal($1)")
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| quoting_error("<password>", e))
    }

    async fn observe(&self, credentials: &DatabaseCredentials) -> Result<ObservedState, ProvisioningError> {
        let role_exists: bool = query_scalar("SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)")
            .bind(&credentials.database_user)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| statement_error("check_role", e))?;

        let database_owner: Option<String> =
            query_scalar("SELECT pg_get_userbyid(datdba)::text FROM pg_database WHERE datname = $1")
                .bind(&credentials.database_name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| statement_error("check_database", e))?;

        Ok(ObservedState {
            role_exists,
            database_owner,
        })
    }
}

fn quoting_error(identifier: &str, err: sqlx::Error) -> ProvisioningError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            ProvisioningError::Connection(err.to_string())
        }
        other => ProvisioningError::Quoting {
            identifier: identifier.to_string(),
            message: other.to_string(),
        },
    }
}

fn statement_error(step: &'static str, err: sqlx::Error) -> ProvisioningError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            ProvisioningError::Connection(err.to_string())
        }
        other => ProvisioningError::Statement {
            step,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl DatabaseProvisioner for PostgresProvisioner {
    async fn ensure(&self, credentials: &DatabaseCredentials) -> Result<(), ProvisioningError> {
        let quoted = QuotedNames {
            role: self.quote_ident(&credentials.database_user).await?,
            database: self.quote_ident(&credentials.database_name).await?,
            password: self.quote_literal(&credentials.password).await?,
        };

        let observed = self.observe(credentials).await?;
        debug!(
            database = %credentials.database_name,
            role_exists = observed.role_exists,
            database_exists = observed.database_owner.is_some(),
            "Observed tenant database state"
        );

        for statement in plan_statements(&observed, &credentials.database_user, &quoted) {
            query(&statement.sql)
                .execute(&self.pool)
                .await
                .map_err(|e| statement_error(statement.step, e))?;
            debug!(step = statement.step, database = %credentials.database_name, "Administrative statement applied");
        }

        info!(
            database = %credentials.database_name,
            user = %credentials.database_user,
            "Tenant database ensured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted() -> QuotedNames {
        QuotedNames {
            role: "\"acme-corp_user\"".to_string(),
            database: "\"acme-corp_compliance_db\"".to_string(),
            password: "'p@ss''word'".to_string(),
        }
    }

    fn steps(statements: &[AdminStatement]) -> Vec<&'static str> {
        statements.iter().map(|s| s.step).collect()
    }

    #[test]
    fn test_fresh_server_creates_everything() {
        let observed = ObservedState {
            role_exists: false,
            database_owner: None,
        };
        let plan = plan_statements(&observed, "acme-corp_user", &quoted());

        assert_eq!(steps(&plan), vec!["create_role", "create_database", "grant_privileges"]);
        assert_eq!(
            plan[0].sql,
            "CREATE ROLE \"acme-corp_user\" WITH LOGIN PASSWORD 'p@ss''word'"
        );
        assert_eq!(
            plan[1].sql,
            "CREATE DATABASE \"acme-corp_compliance_db\" OWNER \"acme-corp_user\""
        );
    }

    #[test]
    fn test_existing_role_gets_password_reset() {
        let observed = ObservedState {
            role_exists: true,
            database_owner: Some("acme-corp_user".to_string()),
        };
        let plan = plan_statements(&observed, "acme-corp_user", &quoted());

        assert_eq!(steps(&plan), vec!["alter_role", "grant_privileges"]);
        assert!(plan[0].sql.starts_with("ALTER ROLE \"acme-corp_user\""));
    }

    #[test]
    fn test_wrong_owner_is_reconciled() {
        let observed = ObservedState {
            role_exists: true,
            database_owner: Some("postgres".to_string()),
        };
        let plan = plan_statements(&observed, "acme-corp_user", &quoted());

        assert_eq!(steps(&plan), vec!["alter_role", "alter_database_owner", "grant_privileges"]);
        assert_eq!(
            plan[1].sql,
            "ALTER DATABASE \"acme-corp_compliance_db\" OWNER TO \"acme-corp_user\""
        );
    }

    #[test]
    fn test_plan_never_drops() {
        for role_exists in [true, false] {
            for owner in [None, Some("postgres".to_string()), Some("acme-corp_user".to_string())] {
                let observed = ObservedState {
                    role_exists,
                    database_owner: owner,
                };
                let plan = plan_statements(&observed, "acme-corp_user", &quoted());
                assert!(plan.iter().all(|s| !s.sql.contains("DROP")));
                assert_eq!(plan.last().map(|s| s.step), Some("grant_privileges"));
            }
        }
    }

    #[test]
    fn test_statement_debug_hides_password() {
        let plan = plan_statements(
            &ObservedState {
                role_exists: false,
                database_owner: None,
            },
            "acme-corp_user",
            &quoted(),
        );
        assert!(!format!("{:?}", plan).contains("p@ss"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        let config = AdminDatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout: Duration::from_secs(1),
            ..Default::default()
        };
        let provisioner = PostgresProvisioner::connect_lazy(&config).unwrap();
        let credentials = tenantry_core::generate_database_credentials("acme");

        let err = provisioner.ensure(&credentials).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Connection(_)), "{:?}", err);
    }
}
