//! Primary-owner memberships

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source tag applied to memberships created by the engine.
pub const SYSTEM_SOURCE: &str = "system";

/// How primary ownership is assigned in an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryOwnerMode {
    User,
    Hybrid,
    Group,
}

impl PrimaryOwnerMode {
    /// Whether ingestion assigns a user as primary owner in this mode.
    pub fn assigns_user(&self) -> bool {
        matches!(self, PrimaryOwnerMode::User | PrimaryOwnerMode::Hybrid)
    }
}

/// Kind of member a membership points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    User,
    Group,
}

/// Primary-owner link between a member and a federated API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub member_id: String,
    pub member_type: MemberType,
    pub role_id: String,

    /// The API this membership applies to
    pub reference_id: String,

    /// Always `"system"` for engine-created memberships
    pub source: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Primary-owner membership for a newly ingested API.
    pub fn primary_owner(
        id: String,
        member_id: &str,
        organization_id: &str,
        api_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            member_id: member_id.to_string(),
            member_type: MemberType::User,
            role_id: primary_owner_role_id(organization_id),
            reference_id: api_id.to_string(),
            source: SYSTEM_SOURCE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The per-organization id of the API primary-owner role.
pub fn primary_owner_role_id(organization_id: &str) -> String {
    format!("api-po-{organization_id}")
}
