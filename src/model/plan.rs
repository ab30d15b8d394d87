//! Federated plan aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::derive_plan_id;
use crate::model::external::{ExternalPlan, PlanType};

/// How subscriptions to a plan are approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanValidation {
    Manual,
    Auto,
}

/// Publication state of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Staging,
    Published,
    Closed,
}

/// Internal plan tied to a federated API.
///
/// Ingested plans are always manually validated and immediately published;
/// only the name and description move on re-ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedPlan {
    pub id: String,
    pub api_id: String,

    /// The provider's plan id, kept for traceability
    pub provider_plan_id: String,

    pub name: String,
    pub description: String,
    pub security: PlanType,
    pub validation: PlanValidation,
    pub status: PlanStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FederatedPlan {
    /// Build a fresh plan from an externally advertised one.
    pub fn from_external(external: &ExternalPlan, api_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: derive_plan_id(api_id, &external.external_plan_id),
            api_id: api_id.to_string(),
            provider_plan_id: external.external_plan_id.clone(),
            name: external.name.clone(),
            description: external.description.clone(),
            security: external.plan_type,
            validation: PlanValidation::Manual,
            status: PlanStatus::Published,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the upstream-owned fields on an existing plan.
    pub fn merge_external(&self, external: &ExternalPlan, now: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.name = external.name.clone();
        updated.description = external.description.clone();
        updated.updated_at = now;
        updated
    }
}
