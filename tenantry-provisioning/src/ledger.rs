//! Per-attempt record of provisioning step outcomes

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Steps of a provisioning attempt, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerStep {
    GenerateCredentials,
    DirectoryRow,
    PostgresProvision,
    ConnectionAlias,
    Migrations,
    Templates,
    FinalStatus,
}

impl LedgerStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStep::GenerateCredentials => "generate_credentials",
            LedgerStep::DirectoryRow => "directory_row",
            LedgerStep::PostgresProvision => "postgres_provision",
            LedgerStep::ConnectionAlias => "django_alias",
            LedgerStep::Migrations => "migrations",
            LedgerStep::Templates => "templates",
            LedgerStep::FinalStatus => "final_status",
        }
    }
}

impl fmt::Display for LedgerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StepOutcome {
    pub ok: bool,
    /// Step satisfied by an earlier attempt's result
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reused: bool,
    /// Step deliberately not executed
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn reused() -> Self {
        Self {
            ok: true,
            reused: true,
            ..Default::default()
        }
    }

    pub fn skipped() -> Self {
        Self {
            ok: true,
            skipped: true,
            ..Default::default()
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Ordered mapping of step to outcome.
///
/// Serializes as a JSON object whose keys follow execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisioningLedger {
    steps: Vec<(LedgerStep, StepOutcome)>,
}

impl ProvisioningLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome, replacing any earlier entry for the same step
    pub fn record(&mut self, step: LedgerStep, outcome: StepOutcome) {
        match self.steps.iter_mut().find(|(existing, _)| *existing == step) {
            Some((_, slot)) => *slot = outcome,
            None => self.steps.push((step, outcome)),
        }
    }

    pub fn get(&self, step: LedgerStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, outcome)| outcome)
    }

    /// Whether the step was recorded and succeeded
    pub fn is_ok(&self, step: LedgerStep) -> bool {
        self.get(step).is_some_and(|outcome| outcome.ok)
    }

    pub fn steps(&self) -> impl Iterator<Item = (LedgerStep, &StepOutcome)> {
        self.steps.iter().map(|(step, outcome)| (*step, outcome))
    }

    /// Whether any step was reused or skipped
    pub fn has_reuse_flags(&self) -> bool {
        self.steps.iter().any(|(_, o)| o.reused || o.skipped)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

impl Serialize for ProvisioningLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.steps.len()))?;
        for (step, outcome) in &self.steps {
            map.serialize_entry(step.as_str(), outcome)?;
        }
        map.end()
    }
}
