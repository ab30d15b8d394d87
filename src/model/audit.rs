//! Append-only audit trail

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who is acting, and in which tenancy scope.
///
/// Carried through every use case so audit entries can be attributed without
/// threading three separate strings everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditActor {
    pub organization_id: String,
    pub environment_id: String,
    pub user_id: String,
}

impl AuditActor {
    pub fn new(
        organization_id: impl Into<String>,
        environment_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            environment_id: environment_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// What kind of entity an audit entry references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditReferenceType {
    Api,
}

/// State changes recorded by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    ApiCreated,
    ApiUpdated,
    ApiDeleted,
    MembershipCreated,
    PlanCreated,
    PlanUpdated,
    PageCreated,
    PageUpdated,
    SubscriptionClosed,
}

/// Immutable log of one state change. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub organization_id: String,
    pub environment_id: String,
    pub reference_type: AuditReferenceType,
    pub reference_id: String,
    pub event: AuditEvent,
    pub user: String,

    /// Upper-cased reference names to related entities, e.g. `PLAN` -> plan id
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Entry with no extra properties.
    pub fn new(
        id: String,
        actor: &AuditActor,
        reference_id: &str,
        event: AuditEvent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::with_properties(id, actor, reference_id, event, BTreeMap::new(), created_at)
    }

    /// Entry carrying related-entity properties.
    pub fn with_properties(
        id: String,
        actor: &AuditActor,
        reference_id: &str,
        event: AuditEvent,
        properties: BTreeMap<String, String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organization_id: actor.organization_id.clone(),
            environment_id: actor.environment_id.clone(),
            reference_type: AuditReferenceType::Api,
            reference_id: reference_id.to_string(),
            event,
            user: actor.user_id.clone(),
            properties,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_carries_actor_scope() {
        let actor = AuditActor::new("org-1", "env-1", "user-1");
        let at = "2023-10-22T10:15:30Z".parse().unwrap();
        let entry = AuditEntry::new("audit-1".to_string(), &actor, "api-1", AuditEvent::ApiCreated, at);
        assert_eq!(entry.organization_id, "org-1");
        assert_eq!(entry.environment_id, "env-1");
        assert_eq!(entry.user, "user-1");
        assert_eq!(entry.reference_id, "api-1");
        assert!(entry.properties.is_empty());
    }

    #[test]
    fn test_event_wire_names_are_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&AuditEvent::MembershipCreated).unwrap(),
            "\"MEMBERSHIP_CREATED\""
        );
        assert_eq!(
            serde_json::to_string(&AuditEvent::SubscriptionClosed).unwrap(),
            "\"SUBSCRIPTION_CLOSED\""
        );
    }
}
