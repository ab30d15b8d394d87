//! Subscriptions and API keys
//!
//! The engine never creates these; retraction closes or deletes them when
//! their API is retracted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Pending,
    Accepted,
    Paused,
    Rejected,
    Closed,
}

impl SubscriptionStatus {
    /// Active subscriptions must be closed (not deleted outright) so the
    /// consumer side sees a proper termination.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Accepted | SubscriptionStatus::Paused)
    }
}

/// A consumer's subscription to a plan of a federated API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub api_id: String,
    pub plan_id: String,
    pub application_id: String,
    pub status: SubscriptionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Close this subscription.
    pub fn close(&self, now: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.status = SubscriptionStatus::Closed;
        updated.closed_at = Some(now);
        updated.updated_at = now;
        updated
    }
}

/// An API key issued under a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: String,
    pub subscription_id: String,
    pub key: String,
    pub revoked: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Revoke this key.
    pub fn revoke(&self, now: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.revoked = true;
        updated.revoked_at = Some(now);
        updated
    }
}
