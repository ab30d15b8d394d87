//! Documentation pages derived from external API specs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::external::{ExternalPage, ExternalPageType};

/// Kind of an ingested documentation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    Swagger,
    #[serde(rename = "ASYNCAPI")]
    AsyncApi,
}

impl PageType {
    /// Map an external artifact kind onto an ingestable page type.
    pub fn from_external(page_type: ExternalPageType) -> Option<Self> {
        match page_type {
            ExternalPageType::Swagger => Some(PageType::Swagger),
            ExternalPageType::AsyncApi => Some(PageType::AsyncApi),
            _ => None,
        }
    }

    /// File-style suffix appended to the owning API's name.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            PageType::Swagger => "-oas.yml",
            PageType::AsyncApi => ".json",
        }
    }
}

/// Page visibility in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageVisibility {
    Public,
    Private,
}

/// Compute a page's display name from its owning API's current name.
///
/// The name follows the API: renaming the API on re-ingestion renames the
/// page as well.
pub fn page_name(api_name: &str, page_type: PageType) -> String {
    format!("{}{}", api_name, page_type.name_suffix())
}

/// An internal documentation page owned by a federated API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationPage {
    pub id: String,

    /// Owning API id
    pub reference_id: String,

    pub name: String,
    pub page_type: PageType,
    pub content: String,
    pub visibility: PageVisibility,
    pub homepage: bool,
    pub published: bool,

    /// Viewer configuration; OpenAPI pages get the default Swagger viewer
    #[serde(default)]
    pub configuration: BTreeMap<String, String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentationPage {
    /// Build a fresh page for a federated API.
    pub fn new(
        id: String,
        api_id: &str,
        api_name: &str,
        page_type: PageType,
        content: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reference_id: api_id.to_string(),
            name: page_name(api_name, page_type),
            page_type,
            content: content.to_string(),
            visibility: PageVisibility::Private,
            homepage: true,
            published: true,
            configuration: default_configuration(page_type),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a fresh page from an ingestable external artifact.
    ///
    /// Returns `None` for artifact kinds the engine ignores.
    pub fn from_external(
        external: &ExternalPage,
        id: String,
        api_id: &str,
        api_name: &str,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let page_type = PageType::from_external(external.page_type)?;
        Some(Self::new(id, api_id, api_name, page_type, &external.content, now))
    }

    /// Rewrite content and recompute the name from the API's current name.
    pub fn refresh(&self, content: &str, api_name: &str, now: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.content = content.to_string();
        updated.name = page_name(api_name, self.page_type);
        updated.updated_at = now;
        updated
    }
}

fn default_configuration(page_type: PageType) -> BTreeMap<String, String> {
    match page_type {
        PageType::Swagger => BTreeMap::from([
            ("tryIt".to_string(), "true".to_string()),
            ("viewer".to_string(), "Swagger".to_string()),
        ]),
        PageType::AsyncApi => BTreeMap::new(),
    }
}
