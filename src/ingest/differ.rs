//! Catalog differ
//!
//! Classifies one discovered API against the internal catalog for preview
//! purposes. Any id match is reported as an update, even for byte-identical
//! content: discovery is a cheap preview aid, not change detection.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::derive_api_id;
use crate::model::ExternalApi;
use crate::store::ApiStore;

/// Preview classification of a discovered API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffState {
    New,
    Update,
}

/// One row of the discovery preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredApi {
    /// The id the asset will have (or already has) in the catalog
    pub id: String,
    pub name: String,
    pub state: DiffState,
}

/// Classify one external API against the stored catalog.
pub async fn classify(
    external: &ExternalApi,
    environment_id: &str,
    integration_id: &str,
    apis: &dyn ApiStore,
) -> Result<DiscoveredApi> {
    let id = derive_api_id(environment_id, integration_id, &external.external_unique_id);
    let state = if apis.find_by_id(&id).await?.is_some() {
        DiffState::Update
    } else {
        DiffState::New
    };
    Ok(DiscoveredApi {
        id,
        name: external.name.clone(),
        state,
    })
}
