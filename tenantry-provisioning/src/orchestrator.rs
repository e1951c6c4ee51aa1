//! Tenant provisioning workflow
//!
//! A provisioning attempt walks through these steps, recording each one in
//! a [`ProvisioningLedger`]:
//!
//! 1. generate credentials
//! 2. insert the directory row with status `PROVISIONING`
//! 3. reconcile the tenant role and database
//! 4. register the tenant connection
//! 5. ask the collaborating service to migrate the schema
//! 6. ask the collaborating service to seed templates
//! 7. set the final status
//!
//! Steps 1-3 are fatal: a failure marks the row `PROVISIONING_FAILED` and the
//! attempt returns a [`ProvisioningFailure`]. The remote calls in steps 5 and
//! 6 only degrade the final status, which is `ACTIVE` iff steps 3-6 all
//! succeeded.
//!
//! A second request for an existing active slug takes the reuse path: the
//! stored credentials are kept and the connection is registered from them
//! before steps 5-7 run again. The role and database are reconciled again
//! unless the row is already `ACTIVE`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tenantry_core::{
    generate_database_credentials, validate_and_normalize_slug, validate_company_name, DatabaseCredentials,
    NewTenant, SecretCodec, SubscriptionPlan, TenantRecord, TenantStatus, TenantryError,
};
use tenantry_interfaces::{
    DatabaseProvisioner, DirectoryError, RemoteOrchestrator, TemplateDistribution, TenantDirectory,
};
use tracing::{error, info, warn};

use crate::lease::SlugLeases;
use crate::ledger::{LedgerStep, ProvisioningLedger, StepOutcome};
use crate::registry::ConnectionRegistry;

/// Coordinates recorded on new tenants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningSettings {
    pub tenant_host: String,
    pub tenant_port: u16,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            tenant_host: "localhost".to_string(),
            tenant_port: 5432,
        }
    }
}

/// Create-tenant request as received from the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTenantRequest {
    pub tenant_slug: Option<String>,
    pub company_name: Option<String>,
    pub subscription_plan: Option<String>,
    /// Frameworks to seed; `None` seeds all of them
    pub framework_ids: Option<Vec<i64>>,
}

impl CreateTenantRequest {
    pub fn new(tenant_slug: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            tenant_slug: Some(tenant_slug.into()),
            company_name: Some(company_name.into()),
            ..Default::default()
        }
    }
}

/// Result of an attempt that got past the fatal steps
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningOutcome {
    pub tenant: TenantRecord,
    pub connection_name: String,
    pub ledger: ProvisioningLedger,
    /// Whether the attempt took the reuse path
    pub reused: bool,
}

impl ProvisioningOutcome {
    pub fn is_active(&self) -> bool {
        self.tenant.status == TenantStatus::Active
    }
}

/// Attempt aborted by validation or by a fatal step.
///
/// Carries the ledger so callers see which steps ran before the abort.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ProvisioningFailure {
    pub error: TenantryError,
    /// The directory row, when one was created or found
    pub tenant: Option<TenantRecord>,
    pub ledger: ProvisioningLedger,
}

impl ProvisioningFailure {
    fn rejected(error: impl Into<TenantryError>) -> Self {
        Self {
            error: error.into(),
            tenant: None,
            ledger: ProvisioningLedger::new(),
        }
    }
}

/// Result of re-seeding templates into an existing tenant
#[derive(Debug, Clone, Serialize)]
pub struct RedistributionOutcome {
    pub tenant_slug: String,
    pub company_name: String,
    pub distribution: TemplateDistribution,
}

pub struct ProvisioningOrchestrator {
    directory: Arc<dyn TenantDirectory>,
    provisioner: Arc<dyn DatabaseProvisioner>,
    remote: Arc<dyn RemoteOrchestrator>,
    registry: Arc<ConnectionRegistry>,
    codec: SecretCodec,
    settings: ProvisioningSettings,
    leases: SlugLeases,
}

impl ProvisioningOrchestrator {
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        provisioner: Arc<dyn DatabaseProvisioner>,
        remote: Arc<dyn RemoteOrchestrator>,
        registry: Arc<ConnectionRegistry>,
        codec: SecretCodec,
        settings: ProvisioningSettings,
    ) -> Self {
        Self {
            directory,
            provisioner,
            remote,
            registry,
            codec,
            settings,
            leases: SlugLeases::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn directory(&self) -> &Arc<dyn TenantDirectory> {
        &self.directory
    }

    /// Provision a tenant, or re-wire an existing one.
    ///
    /// Input is validated before any side effect. Attempts for the same slug
    /// queue behind each other.
    pub async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<ProvisioningOutcome, ProvisioningFailure> {
        let tenant_slug =
            validate_and_normalize_slug(request.tenant_slug.as_deref()).map_err(ProvisioningFailure::rejected)?;
        let company_name =
            validate_company_name(request.company_name.as_deref()).map_err(ProvisioningFailure::rejected)?;
        let subscription_plan = match request.subscription_plan.as_deref() {
            Some(plan) => plan.parse::<SubscriptionPlan>().map_err(ProvisioningFailure::rejected)?,
            None => SubscriptionPlan::default(),
        };

        let _lease = self.leases.acquire(&tenant_slug).await;
        let mut ledger = ProvisioningLedger::new();

        let existing = self
            .directory
            .get_by_slug(&tenant_slug, false)
            .await
            .map_err(ProvisioningFailure::rejected)?;
        if let Some(record) = existing {
            return self.reuse(record, ledger, request.framework_ids).await;
        }

        info!(tenant_slug = %tenant_slug, "Provisioning new tenant");

        // 1. credentials
        let credentials = generate_database_credentials(&tenant_slug);
        let encrypted = match self.codec.encrypt(&credentials.password) {
            Ok(encrypted) => encrypted,
            Err(e) => return Err(self.abort(ledger, LedgerStep::GenerateCredentials, e.into(), None).await),
        };
        ledger.record(
            LedgerStep::GenerateCredentials,
            StepOutcome::ok().with_detail(json!({
                "database_name": credentials.database_name,
                "database_user": credentials.database_user,
            })),
        );

        // 2. directory row
        let new_tenant = NewTenant {
            tenant_slug: tenant_slug.clone(),
            company_name,
            database_name: credentials.database_name.clone(),
            database_user: credentials.database_user.clone(),
            database_password_encrypted: encrypted,
            database_host: self.settings.tenant_host.clone(),
            database_port: self.settings.tenant_port,
            subscription_plan,
            status: TenantStatus::Provisioning,
        };
        let record = match self.directory.create(new_tenant).await {
            Ok(record) => record,
            Err(DirectoryError::DuplicateSlug { .. }) => {
                // Lost a race with another process; the winner's row stands
                warn!(tenant_slug = %tenant_slug, "Slug claimed concurrently, switching to reuse path");
                return match self.directory.get_by_slug(&tenant_slug, false).await {
                    Ok(Some(record)) => self.reuse(record, ledger, request.framework_ids).await,
                    Ok(None) => Err(ProvisioningFailure {
                        error: TenantryError::DuplicateSlug(tenant_slug),
                        tenant: None,
                        ledger,
                    }),
                    Err(e) => Err(self.abort(ledger, LedgerStep::DirectoryRow, e.into(), None).await),
                };
            }
            Err(e) => return Err(self.abort(ledger, LedgerStep::DirectoryRow, e.into(), None).await),
        };
        ledger.record(
            LedgerStep::DirectoryRow,
            StepOutcome::ok().with_detail(json!({ "id": record.id })),
        );

        // 3. role and database
        if let Err(e) = self.provisioner.ensure(&credentials).await {
            return Err(self
                .abort(ledger, LedgerStep::PostgresProvision, e.into(), Some(record))
                .await);
        }
        ledger.record(LedgerStep::PostgresProvision, StepOutcome::ok());

        // 4. connection
        let connection_name = self.wire_connection(&record, &credentials, &mut ledger).await;

        self.finish(record, connection_name, ledger, request.framework_ids, false)
            .await
    }

    async fn wire_connection(
        &self,
        record: &TenantRecord,
        credentials: &DatabaseCredentials,
        ledger: &mut ProvisioningLedger,
    ) -> String {
        let connection_name = self.registry.register_tenant(record, &credentials.password).await;
        ledger.record(
            LedgerStep::ConnectionAlias,
            StepOutcome::ok().with_detail(json!({ "connection_name": connection_name })),
        );
        connection_name
    }

    async fn reuse(
        &self,
        record: TenantRecord,
        mut ledger: ProvisioningLedger,
        framework_ids: Option<Vec<i64>>,
    ) -> Result<ProvisioningOutcome, ProvisioningFailure> {
        if !record.is_active {
            return Err(ProvisioningFailure {
                error: TenantryError::DuplicateSlug(record.tenant_slug.clone()),
                tenant: Some(record),
                ledger,
            });
        }

        info!(tenant_slug = %record.tenant_slug, status = %record.status, "Tenant exists, reusing stored credentials");

        ledger.record(LedgerStep::GenerateCredentials, StepOutcome::reused());
        ledger.record(
            LedgerStep::DirectoryRow,
            StepOutcome::reused().with_detail(json!({ "id": record.id })),
        );

        let password = match self.codec.decrypt(&record.database_password_encrypted) {
            Ok(password) => password,
            Err(e) => {
                return Err(self
                    .abort(ledger, LedgerStep::GenerateCredentials, e.into(), Some(record))
                    .await)
            }
        };
        let credentials = DatabaseCredentials {
            database_name: record.database_name.clone(),
            database_user: record.database_user.clone(),
            password,
        };

        // Only an ACTIVE row proves the role and database exist; anything
        // else gets the idempotent reconcile again
        if record.status == TenantStatus::Active {
            ledger.record(LedgerStep::PostgresProvision, StepOutcome::skipped());
        } else {
            if let Err(e) = self.provisioner.ensure(&credentials).await {
                return Err(self
                    .abort(ledger, LedgerStep::PostgresProvision, e.into(), Some(record))
                    .await);
            }
            ledger.record(
                LedgerStep::PostgresProvision,
                StepOutcome::ok().with_detail(json!({ "retried_from": record.status })),
            );
        }

        let connection_name = self.wire_connection(&record, &credentials, &mut ledger).await;

        self.finish(record, connection_name, ledger, framework_ids, true).await
    }

    /// Steps 5-7
    async fn finish(
        &self,
        record: TenantRecord,
        connection_name: String,
        mut ledger: ProvisioningLedger,
        framework_ids: Option<Vec<i64>>,
        reused: bool,
    ) -> Result<ProvisioningOutcome, ProvisioningFailure> {
        let tenant_slug = record.tenant_slug.clone();

        let migrations = match self.remote.run_migrations(&tenant_slug, &connection_name).await {
            Ok(()) => StepOutcome::ok(),
            Err(failure) => {
                warn!(tenant_slug = %tenant_slug, step = "migrations", "Remote call failed: {}", failure);
                StepOutcome::failed(failure)
            }
        };
        ledger.record(LedgerStep::Migrations, migrations);

        let templates = match self.remote.seed_templates(&tenant_slug, framework_ids).await {
            Ok(distribution) => template_outcome(&distribution),
            Err(failure) => {
                warn!(tenant_slug = %tenant_slug, step = "templates", "Remote call failed: {}", failure);
                StepOutcome::failed(failure)
            }
        };
        ledger.record(LedgerStep::Templates, templates);

        let succeeded = [
            LedgerStep::PostgresProvision,
            LedgerStep::ConnectionAlias,
            LedgerStep::Migrations,
            LedgerStep::Templates,
        ]
        .into_iter()
        .all(|step| ledger.is_ok(step));
        let status = if succeeded {
            TenantStatus::Active
        } else {
            TenantStatus::ProvisioningFailed
        };

        let tenant = match self.directory.update_status(&record, status).await {
            Ok(tenant) => tenant,
            Err(e) => {
                error!(tenant_slug = %tenant_slug, "Could not record final status: {}", e);
                ledger.record(
                    LedgerStep::FinalStatus,
                    StepOutcome::failed(&e).with_detail(json!({ "status": status })),
                );
                return Err(ProvisioningFailure {
                    error: e.into(),
                    tenant: Some(record),
                    ledger,
                });
            }
        };

        let final_outcome = StepOutcome {
            ok: succeeded,
            detail: Some(json!({ "status": status })),
            ..Default::default()
        };
        ledger.record(LedgerStep::FinalStatus, final_outcome);

        info!(
            tenant_slug = %tenant_slug,
            connection_name = %connection_name,
            status = %status,
            reused,
            "Provisioning attempt finished"
        );

        Ok(ProvisioningOutcome {
            tenant,
            connection_name,
            ledger,
            reused,
        })
    }

    /// Record a fatal step failure and mark the row failed when there is one
    async fn abort(
        &self,
        mut ledger: ProvisioningLedger,
        step: LedgerStep,
        error: TenantryError,
        record: Option<TenantRecord>,
    ) -> ProvisioningFailure {
        error!(step = %step, "Provisioning aborted: {}", error);
        ledger.record(step, StepOutcome::failed(&error));

        let tenant = match record {
            Some(record) => {
                let status = TenantStatus::ProvisioningFailed;
                let tenant = match self.directory.update_status(&record, status).await {
                    Ok(updated) => updated,
                    Err(e) => {
                        error!(tenant_slug = %record.tenant_slug, "Could not mark tenant failed: {}", e);
                        record
                    }
                };
                ledger.record(
                    LedgerStep::FinalStatus,
                    StepOutcome {
                        ok: false,
                        detail: Some(json!({ "status": tenant.status })),
                        ..Default::default()
                    },
                );
                Some(tenant)
            }
            None => None,
        };

        ProvisioningFailure { error, tenant, ledger }
    }

    /// Re-run template seeding for an existing active tenant
    pub async fn redistribute_templates(
        &self,
        tenant_slug: Option<&str>,
        framework_ids: Option<Vec<i64>>,
    ) -> Result<RedistributionOutcome, TenantryError> {
        let tenant_slug = validate_and_normalize_slug(tenant_slug)?;
        let record = self
            .directory
            .get_by_slug(&tenant_slug, true)
            .await?
            .ok_or_else(|| TenantryError::TenantNotFound(tenant_slug.clone()))?;

        let distribution = self.remote.seed_templates(&tenant_slug, framework_ids).await?;
        info!(
            tenant_slug = %tenant_slug,
            frameworks_copied = distribution.frameworks_copied,
            "Templates redistributed"
        );

        Ok(RedistributionOutcome {
            tenant_slug,
            company_name: record.company_name,
            distribution,
        })
    }
}

fn template_outcome(distribution: &TemplateDistribution) -> StepOutcome {
    let detail = serde_json::to_value(distribution).unwrap_or(Value::Null);
    if distribution.success {
        StepOutcome::ok().with_detail(detail)
    } else {
        StepOutcome::failed("collaborating service reported success=false").with_detail(detail)
    }
}
