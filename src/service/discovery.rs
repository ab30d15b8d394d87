//! Discovery preview
//!
//! Lists what an integration exposes and classifies each asset against the
//! catalog, without mutating anything.

use log::debug;

use super::FederationService;
use crate::error::{Error, Result};
use crate::ingest::{DiscoveredApi, classify, for_each_bounded};
use crate::license::require_federation;
use crate::model::AuditActor;

impl FederationService {
    /// Preview what ingesting the integration would do.
    ///
    /// Fails with [`Error::NotAllowed`] or [`Error::IntegrationNotFound`]
    /// before the agent is contacted.
    pub async fn discover(
        &self,
        integration_id: &str,
        actor: &AuditActor,
    ) -> Result<Vec<DiscoveredApi>> {
        require_federation(self.license.as_ref(), &actor.organization_id).await?;

        let integration = self
            .integrations
            .find_by_id(integration_id)
            .await?
            .ok_or_else(|| Error::IntegrationNotFound(integration_id.to_string()))?;

        let externals = self.agent.list_apis(integration_id).await?;
        debug!(
            "Integration '{integration_id}' exposes {} api(s)",
            externals.len()
        );

        let outcomes = for_each_bounded(externals, self.config.ingest_concurrency, |external| {
            let environment_id = integration.environment_id.clone();
            async move {
                classify(
                    &external,
                    &environment_id,
                    integration_id,
                    self.catalog.apis.as_ref(),
                )
                .await
            }
        })
        .await;

        outcomes.into_iter().collect()
    }
}
