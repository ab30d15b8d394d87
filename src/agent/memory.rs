//! In-memory integration agent
//!
//! Configure the catalog per integration, then point the engine at it.
//! Used by the engine's own tests and by embedders' test suites.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AgentStatus, IntegrationAgent};
use crate::error::{Error, Result};
use crate::model::ExternalApi;

/// Agent double backed by a per-integration map.
#[derive(Default)]
pub struct InMemoryIntegrationAgent {
    apis: Mutex<HashMap<String, Vec<ExternalApi>>>,
    counts: Mutex<HashMap<String, u64>>,
    /// Error to return on the next call, consumed on first use
    error: Mutex<Option<String>>,
}

impl InMemoryIntegrationAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the APIs an integration exposes. The discoverable count
    /// follows the list unless overridden with [`with_count`](Self::with_count).
    pub fn with_apis(self, integration_id: &str, apis: Vec<ExternalApi>) -> Self {
        self.counts
            .lock()
            .unwrap()
            .insert(integration_id.to_string(), apis.len() as u64);
        self.apis
            .lock()
            .unwrap()
            .insert(integration_id.to_string(), apis);
        self
    }

    /// Override the discoverable count reported for an integration.
    pub fn with_count(self, integration_id: &str, count: u64) -> Self {
        self.counts
            .lock()
            .unwrap()
            .insert(integration_id.to_string(), count);
        self
    }

    /// Fail the next agent call with the given message.
    pub fn with_error(self, message: &str) -> Self {
        *self.error.lock().unwrap() = Some(message.to_string());
        self
    }

    fn take_error(&self) -> Option<Error> {
        self.error.lock().unwrap().take().map(Error::Agent)
    }
}

#[async_trait]
impl IntegrationAgent for InMemoryIntegrationAgent {
    async fn list_apis(&self, integration_id: &str) -> Result<Vec<ExternalApi>> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        Ok(self
            .apis
            .lock()
            .unwrap()
            .get(integration_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_discoverable(&self, integration_id: &str) -> Result<u64> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        Ok(self
            .counts
            .lock()
            .unwrap()
            .get(integration_id)
            .copied()
            .unwrap_or(0))
    }

    async fn status(&self, integration_id: &str) -> Result<AgentStatus> {
        let connected = self.apis.lock().unwrap().contains_key(integration_id)
            || self.counts.lock().unwrap().contains_key(integration_id);
        Ok(if connected {
            AgentStatus::Connected
        } else {
            AgentStatus::Disconnected
        })
    }
}
