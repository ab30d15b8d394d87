//! External catalog types
//!
//! What an integration reports about its upstream assets. These are already
//! deserialized by the agent transport; the engine only consumes them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One API asset as reported by an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalApi {
    /// Identifier unique within one integration's discovery batch.
    /// Drives internal identity derivation.
    pub external_unique_id: String,

    /// The provider's own asset identifier (not necessarily unique)
    pub external_asset_id: String,

    /// Display name
    pub name: String,

    /// Description, may be empty
    #[serde(default)]
    pub description: String,

    /// Upstream version; `None` maps to the default version on ingestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Server/connection metadata reported by the provider
    #[serde(default)]
    pub connection_details: BTreeMap<String, String>,

    /// Plans advertised for this API
    #[serde(default)]
    pub plans: Vec<ExternalPlan>,

    /// Documentation artifacts; `None` when the provider reports nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<ExternalPage>>,
}

/// A plan advertised for an external API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPlan {
    pub external_plan_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub plan_type: PlanType,
}

/// Security scheme of an external plan, mirrored onto the federated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    ApiKey,
    #[serde(rename = "OAUTH2")]
    OAuth2,
    Jwt,
    KeyLess,
}

/// A documentation artifact attached to an external API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPage {
    pub page_type: ExternalPageType,
    pub content: String,
}

/// Kind of documentation artifact. Only OpenAPI and AsyncAPI documents are
/// ingestable; everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExternalPageType {
    Swagger,
    #[serde(rename = "ASYNCAPI")]
    AsyncApi,
    Markdown,
    Asciidoc,
}

impl ExternalPageType {
    /// Whether the engine ingests this artifact kind.
    pub fn is_ingestable(&self) -> bool {
        matches!(self, ExternalPageType::Swagger | ExternalPageType::AsyncApi)
    }
}
