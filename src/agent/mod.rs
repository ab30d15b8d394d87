//! Integration agent boundary
//!
//! The agent speaks the provider protocol and hands the engine
//! already-deserialized catalog objects. It may be slow or unreachable; every
//! call is a suspension point.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ExternalApi;

pub mod memory;

pub use memory::InMemoryIntegrationAgent;

/// Reachability of the agent for one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Connected,
    Disconnected,
}

/// Boundary to the external integration runtime.
#[async_trait]
pub trait IntegrationAgent: Send + Sync {
    /// List the API assets the integration currently exposes.
    async fn list_apis(&self, integration_id: &str) -> Result<Vec<ExternalApi>>;

    /// How many APIs a full listing would return. Used to size ingestion
    /// jobs without fetching the catalog.
    async fn count_discoverable(&self, integration_id: &str) -> Result<u64>;

    /// Whether the agent currently has a live connection for the integration.
    async fn status(&self, integration_id: &str) -> Result<AgentStatus>;
}
