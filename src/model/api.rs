//! Federated API aggregate

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::derive_api_id;
use crate::model::external::ExternalApi;

/// Version assigned when the upstream asset reports none.
pub const DEFAULT_API_VERSION: &str = "0.0.0";

/// Where an API definition originates.
///
/// Federated APIs are owned by an integration; natively-authored APIs are
/// not touched by this engine but share the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginContext {
    Integration { integration_id: String },
    Native,
}

impl OriginContext {
    /// The integration id when this API is federated.
    pub fn integration_id(&self) -> Option<&str> {
        match self {
            OriginContext::Integration { integration_id } => Some(integration_id),
            OriginContext::Native => None,
        }
    }
}

/// Publication lifecycle of an API in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Created,
    Published,
    Unpublished,
    Deprecated,
    Archived,
}

/// Catalog visibility of an API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
    Private,
}

/// Internal representation of an ingested API.
///
/// The id is derived from `(environment, integration, external unique id)` and
/// never regenerated: re-ingesting the same upstream asset updates this record
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedApi {
    pub id: String,
    pub environment_id: String,
    pub origin: OriginContext,

    /// The provider's own asset id, refreshed on every ingestion
    pub provider_asset_id: String,

    pub name: String,
    pub description: String,
    pub version: String,

    /// Server/connection metadata carried from the upstream definition
    #[serde(default)]
    pub server: BTreeMap<String, String>,

    /// `None` means the record predates lifecycle tracking; retraction treats
    /// it as an error-counted item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<LifecycleState>,

    pub visibility: Visibility,

    // Presentation fields owned by the catalog, never overwritten upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub labels: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FederatedApi {
    /// Build a fresh aggregate from an externally discovered API.
    pub fn from_external(
        external: &ExternalApi,
        environment_id: &str,
        integration_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let version = external
            .version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_API_VERSION)
            .to_string();

        Self {
            id: derive_api_id(environment_id, integration_id, &external.external_unique_id),
            environment_id: environment_id.to_string(),
            origin: OriginContext::Integration {
                integration_id: integration_id.to_string(),
            },
            provider_asset_id: external.external_asset_id.clone(),
            name: external.name.clone(),
            description: external.description.clone(),
            version,
            server: external.connection_details.clone(),
            lifecycle_state: Some(LifecycleState::Created),
            visibility: Visibility::Private,
            picture: None,
            background: None,
            categories: BTreeSet::new(),
            groups: BTreeSet::new(),
            labels: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the mutable upstream-reported fields onto this record.
    ///
    /// Identity, creation timestamp, lifecycle, and the presentation fields
    /// are preserved; only what the provider owns moves.
    pub fn merge_external(&self, external: &ExternalApi, now: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.name = external.name.clone();
        updated.description = external.description.clone();
        updated.version = external
            .version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_API_VERSION)
            .to_string();
        updated.server = external.connection_details.clone();
        updated.provider_asset_id = external.external_asset_id.clone();
        updated.updated_at = now;
        updated
    }

    /// Domain validation applied before persisting.
    ///
    /// A failure skips the item within its batch; it never aborts the run.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("api name must not be blank".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(Error::Validation("api version must not be blank".to_string()));
        }
        if self.groups.iter().any(|g| g.trim().is_empty()) {
            return Err(Error::Validation("api group ids must not be blank".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::external::ExternalApi;

    fn an_external_api() -> ExternalApi {
        ExternalApi {
            external_unique_id: "uid-1".to_string(),
            external_asset_id: "asset-1".to_string(),
            name: "inventory".to_string(),
            description: "stock levels".to_string(),
            version: Some("1.1.1".to_string()),
            connection_details: BTreeMap::from([(
                "url".to_string(),
                "https://example.com".to_string(),
            )]),
            plans: vec![],
            pages: None,
        }
    }

    fn now() -> DateTime<Utc> {
        "2023-10-22T10:15:30Z".parse().unwrap()
    }

    #[test]
    fn test_from_external_derives_stable_id() {
        let a = FederatedApi::from_external(&an_external_api(), "env", "int", now());
        let b = FederatedApi::from_external(&an_external_api(), "env", "int", now());
        assert_eq!(a.id, b.id);
        assert_eq!(a.origin.integration_id(), Some("int"));
        assert_eq!(a.lifecycle_state, Some(LifecycleState::Created));
    }

    #[test]
    fn test_missing_version_defaults() {
        let mut external = an_external_api();
        external.version = None;
        let api = FederatedApi::from_external(&external, "env", "int", now());
        assert_eq!(api.version, DEFAULT_API_VERSION);

        external.version = Some("  ".to_string());
        let api = FederatedApi::from_external(&external, "env", "int", now());
        assert_eq!(api.version, DEFAULT_API_VERSION);
    }

    #[test]
    fn test_merge_preserves_protected_fields() {
        let mut stored = FederatedApi::from_external(&an_external_api(), "env", "int", now());
        stored.picture = Some("picture".to_string());
        stored.background = Some("background".to_string());
        stored.labels = vec!["label-1".to_string()];
        stored.groups = BTreeSet::from(["group-1".to_string()]);
        stored.visibility = Visibility::Public;
        stored.lifecycle_state = Some(LifecycleState::Published);

        let mut external = an_external_api();
        external.name = "inventory-v2".to_string();
        external.version = Some("2.0.0".to_string());
        let later = "2023-11-22T10:15:30Z".parse().unwrap();

        let merged = stored.merge_external(&external, later);
        assert_eq!(merged.id, stored.id);
        assert_eq!(merged.name, "inventory-v2");
        assert_eq!(merged.version, "2.0.0");
        assert_eq!(merged.created_at, stored.created_at);
        assert_eq!(merged.updated_at, later);
        assert_eq!(merged.picture.as_deref(), Some("picture"));
        assert_eq!(merged.background.as_deref(), Some("background"));
        assert_eq!(merged.labels, vec!["label-1".to_string()]);
        assert_eq!(merged.visibility, Visibility::Public);
        assert_eq!(merged.lifecycle_state, Some(LifecycleState::Published));
    }

    #[test]
    fn test_blank_name_fails_validation() {
        let mut external = an_external_api();
        external.name = "   ".to_string();
        let api = FederatedApi::from_external(&external, "env", "int", now());
        assert!(api.validate().is_err());
    }
}
