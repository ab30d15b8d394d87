//! License gate
//!
//! Federation is an entitlement-gated capability. Every orchestrating use
//! case checks it before any side effect.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Feature key the engine checks before discovering or mutating.
pub const FEDERATION_FEATURE: &str = "federation";

/// Entitlement lookup for an organization.
#[async_trait]
pub trait LicenseService: Send + Sync {
    async fn is_entitled(&self, organization_id: &str, feature: &str) -> Result<bool>;
}

/// Fail with [`Error::NotAllowed`] unless the organization holds the
/// federation entitlement.
pub async fn require_federation(license: &dyn LicenseService, organization_id: &str) -> Result<()> {
    if license.is_entitled(organization_id, FEDERATION_FEATURE).await? {
        Ok(())
    } else {
        Err(Error::NotAllowed {
            organization_id: organization_id.to_string(),
        })
    }
}

/// In-memory license service holding the entitled organizations.
#[derive(Default)]
pub struct InMemoryLicense {
    entitled: Mutex<HashSet<String>>,
}

impl InMemoryLicense {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the federation entitlement to an organization.
    pub fn entitle(self, organization_id: &str) -> Self {
        self.entitled
            .lock()
            .unwrap()
            .insert(organization_id.to_string());
        self
    }
}

#[async_trait]
impl LicenseService for InMemoryLicense {
    async fn is_entitled(&self, organization_id: &str, _feature: &str) -> Result<bool> {
        Ok(self.entitled.lock().unwrap().contains(organization_id))
    }
}
