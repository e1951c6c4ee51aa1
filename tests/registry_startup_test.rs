//! Startup bulk load of tenant connections from a SQLite directory

use std::sync::Arc;
use tenantry_config::DirectoryConfig;
use tenantry_core::{derive_names, ConnectionConfig, NewTenant, SecretCodec, SubscriptionPlan, TenantStatus};
use tenantry_interfaces::TenantDirectory;
use tenantry_provisioning::ConnectionRegistry;
use tenantry_storage::{DirectoryConnection, SeaOrmTenantDirectory};

const SECRET: &str = "startup-secret";

async fn directory() -> Arc<SeaOrmTenantDirectory> {
    let connection = DirectoryConnection::new(DirectoryConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();
    connection.migrate().await.unwrap();
    Arc::new(SeaOrmTenantDirectory::new(connection))
}

fn tenant(slug: &str, password_encrypted: String) -> NewTenant {
    let (database_name, database_user) = derive_names(slug);
    NewTenant {
        tenant_slug: slug.to_string(),
        company_name: format!("{} Ltd", slug),
        database_name,
        database_user,
        database_password_encrypted: password_encrypted,
        database_host: "tenants.internal".to_string(),
        database_port: 5432,
        subscription_plan: SubscriptionPlan::Enterprise,
        status: TenantStatus::Active,
    }
}

#[tokio::test]
async fn test_one_corrupt_tenant_among_five() {
    let directory = directory().await;
    let codec = SecretCodec::from_secret(SECRET);

    for slug in ["alpha", "bravo", "charlie", "delta"] {
        let encrypted = codec.encrypt(&format!("{}-pw", slug)).unwrap();
        directory.create(tenant(slug, encrypted)).await.unwrap();
    }
    // Encrypted under another secret
    let foreign = SecretCodec::from_secret("someone-else").encrypt("echo-pw").unwrap();
    directory.create(tenant("echo", foreign)).await.unwrap();

    let registry = ConnectionRegistry::new(ConnectionConfig::default(), directory.clone(), codec);
    let report = registry.init().await;

    assert_eq!(report.registered.len(), 4);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "echo");
    assert!(!registry.contains("echo_compliance_db").await);

    let delta = registry.get("delta_compliance_db").await.unwrap();
    assert_eq!(delta.password, "delta-pw");
    assert_eq!(delta.host, "tenants.internal");

    registry.shutdown().await;
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_on_demand_registration_after_startup() {
    let directory = directory().await;
    let codec = SecretCodec::from_secret(SECRET);
    let registry = ConnectionRegistry::new(ConnectionConfig::default(), directory.clone(), codec.clone());
    registry.init().await;
    assert!(registry.is_empty().await);

    let encrypted = codec.encrypt("late-pw").unwrap();
    directory.create(tenant("latecomer", encrypted)).await.unwrap();

    let name = registry.get_or_register_on_demand("latecomer").await.unwrap();
    assert_eq!(name, "latecomer_compliance_db");
    assert_eq!(registry.get(&name).await.unwrap().password, "late-pw");
}
