//! End-to-end provisioning against a SQLite tenant directory and a mocked
//! collaborating service

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tenantry_config::{CollaboratorConfig, DirectoryConfig};
use tenantry_core::{ConnectionConfig, SecretCodec, TenantStatus, TenantryError};
use tenantry_http::{CollaboratorClient, INTERNAL_TOKEN_HEADER};
use tenantry_interfaces::TenantDirectory;
use tenantry_provisioning::testing::MockProvisioner;
use tenantry_provisioning::{
    ConnectionRegistry, CreateTenantRequest, LedgerStep, ProvisioningOrchestrator, ProvisioningSettings,
};
use tenantry_storage::{DirectoryConnection, SeaOrmTenantDirectory};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "e2e-secret";
const TOKEN: &str = "e2e-token";

struct Stack {
    directory: Arc<SeaOrmTenantDirectory>,
    registry: Arc<ConnectionRegistry>,
    orchestrator: ProvisioningOrchestrator,
}

async fn stack(collaborator: &MockServer, provisioner: MockProvisioner) -> Stack {
    let connection = DirectoryConnection::new(DirectoryConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();
    connection.migrate().await.unwrap();
    let directory = Arc::new(SeaOrmTenantDirectory::new(connection));

    let client = CollaboratorClient::new(
        &CollaboratorConfig {
            base_url: collaborator.uri(),
            migrate_timeout: Duration::from_secs(2),
            templates_timeout: Duration::from_secs(2),
            ..Default::default()
        },
        TOKEN,
    )
    .unwrap();

    let codec = SecretCodec::from_secret(SECRET);
    let registry = Arc::new(ConnectionRegistry::new(
        ConnectionConfig::default(),
        directory.clone(),
        codec.clone(),
    ));
    let orchestrator = ProvisioningOrchestrator::new(
        directory.clone(),
        Arc::new(provisioner),
        Arc::new(client),
        registry.clone(),
        codec,
        ProvisioningSettings::default(),
    );

    Stack {
        directory,
        registry,
        orchestrator,
    }
}

fn provisioner(times: usize) -> MockProvisioner {
    let mut provisioner = MockProvisioner::new();
    provisioner.expect_ensure().times(times).returning(|_| Ok(()));
    provisioner
}

async fn mount_healthy_collaborator(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/migrate-tenant/"))
        .and(header(INTERNAL_TOKEN_HEADER, TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/distribute-templates/"))
        .and(header(INTERNAL_TOKEN_HEADER, TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "frameworks_copied": 3})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_acme_becomes_active() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/migrate-tenant/"))
        .and(body_json(json!({"tenant_slug": "acme", "connection_name": "acme_compliance_db"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/distribute-templates/"))
        .and(body_json(json!({"tenant_slug": "acme"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "frameworks_copied": 3})))
        .expect(1)
        .mount(&server)
        .await;
    let stack = stack(&server, provisioner(1)).await;

    let outcome = stack
        .orchestrator
        .create_tenant(CreateTenantRequest::new("acme", "Acme Inc"))
        .await
        .unwrap();

    assert_eq!(outcome.tenant.status, TenantStatus::Active);
    assert_eq!(outcome.tenant.database_name, "acme_compliance_db");
    assert!(stack.registry.contains("acme_compliance_db").await);

    let stored = stack.directory.get_by_slug("acme", true).await.unwrap().unwrap();
    assert_eq!(stored.status, TenantStatus::Active);
    assert!(stored.updated_at >= stored.created_at);
}

#[tokio::test]
async fn test_second_create_reuses_without_reprovisioning() {
    let server = MockServer::start().await;
    mount_healthy_collaborator(&server).await;
    let stack = stack(&server, provisioner(1)).await;

    let first = stack
        .orchestrator
        .create_tenant(CreateTenantRequest::new("acme", "Acme Inc"))
        .await
        .unwrap();
    let second = stack
        .orchestrator
        .create_tenant(CreateTenantRequest::new("acme", "Acme Inc"))
        .await
        .unwrap();

    assert!(!first.ledger.has_reuse_flags());
    assert!(second.ledger.get(LedgerStep::DirectoryRow).unwrap().reused);
    assert!(second.ledger.get(LedgerStep::PostgresProvision).unwrap().skipped);
    assert_eq!(stack.directory.count_by_slug("acme").await.unwrap(), 1);

    // Same stored credentials feed the re-registered connection
    let rewired = stack.registry.get("acme_compliance_db").await.unwrap();
    let bundle = stack.registry.credential_bundle("acme").await.unwrap();
    assert_eq!(rewired.password, bundle.database_password);
}

#[tokio::test]
async fn test_migration_500_marks_provisioning_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/migrate-tenant/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("migration crashed"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/distribute-templates/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "frameworks_copied": 1})))
        .mount(&server)
        .await;
    let stack = stack(&server, provisioner(1)).await;

    let outcome = stack
        .orchestrator
        .create_tenant(CreateTenantRequest::new("acme", "Acme Inc"))
        .await
        .unwrap();

    assert_eq!(outcome.tenant.status, TenantStatus::ProvisioningFailed);
    assert!(outcome.ledger.is_ok(LedgerStep::PostgresProvision));
    let migrations = outcome.ledger.get(LedgerStep::Migrations).unwrap();
    assert!(!migrations.ok);
    assert!(migrations.error.as_deref().unwrap().contains("migration crashed"));

    let stored = stack.directory.get_by_slug("acme", false).await.unwrap().unwrap();
    assert_eq!(stored.status, TenantStatus::ProvisioningFailed);
}

#[tokio::test]
async fn test_slow_collaborator_is_a_ledger_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/migrate-tenant/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/internal/distribute-templates/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"frameworks_copied": 0})))
        .mount(&server)
        .await;
    let stack = stack(&server, provisioner(1)).await;

    let outcome = stack
        .orchestrator
        .create_tenant(CreateTenantRequest::new("slowpoke", "Slowpoke Ltd"))
        .await
        .unwrap();

    let migrations = outcome.ledger.get(LedgerStep::Migrations).unwrap();
    assert!(migrations.error.as_deref().unwrap().contains("timed out"));
    assert!(outcome.ledger.is_ok(LedgerStep::Templates));
    assert_eq!(outcome.tenant.status, TenantStatus::ProvisioningFailed);
}

#[tokio::test]
async fn test_reserved_slug_has_no_side_effects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let mut provisioner = MockProvisioner::new();
    provisioner.expect_ensure().never();
    let stack = stack(&server, provisioner).await;

    let failure = stack
        .orchestrator
        .create_tenant(CreateTenantRequest::new("Template1", "Nope"))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, TenantryError::Validation(_)));
    assert!(stack.directory.list_active().await.unwrap().is_empty());
    assert!(stack.registry.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_creates_share_one_record() {
    let server = MockServer::start().await;
    mount_healthy_collaborator(&server).await;
    let stack = stack(&server, provisioner(1)).await;

    let attempts = (0..3).map(|_| {
        stack
            .orchestrator
            .create_tenant(CreateTenantRequest::new("acme", "Acme Inc"))
    });
    let outcomes = futures::future::join_all(attempts).await;

    assert!(outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(stack.directory.count_by_slug("acme").await.unwrap(), 1);
}
