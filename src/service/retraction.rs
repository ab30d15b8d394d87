//! Retraction use cases
//!
//! Bulk retraction of ingested APIs, and deletion of the integration record
//! itself once nothing references it anymore.

use log::info;

use super::FederationService;
use crate::error::{Error, Result};
use crate::license::require_federation;
use crate::model::AuditActor;
use crate::retract::RetractionSummary;

impl FederationService {
    /// Retract every federated API the integration ingested.
    ///
    /// Partial success is expected: the returned counts are the contract,
    /// not an exception.
    pub async fn delete_ingested_apis(
        &self,
        integration_id: &str,
        actor: &AuditActor,
    ) -> Result<RetractionSummary> {
        require_federation(self.license.as_ref(), &actor.organization_id).await?;

        let summary = self
            .retraction
            .retract_all(integration_id, actor, self.config.retract_concurrency)
            .await?;
        info!(
            "Retraction for integration '{integration_id}': {} deleted, {} skipped, {} errors",
            summary.deleted, summary.skipped, summary.errors
        );
        Ok(summary)
    }

    /// Delete the integration record itself.
    ///
    /// Refuses while federated APIs still reference the integration; callers
    /// must retract them first. There is no cascading auto-delete here.
    pub async fn delete_integration(
        &self,
        integration_id: &str,
        actor: &AuditActor,
    ) -> Result<()> {
        require_federation(self.license.as_ref(), &actor.organization_id).await?;

        if self
            .integrations
            .find_by_id(integration_id)
            .await?
            .is_none()
        {
            return Err(Error::IntegrationNotFound(integration_id.to_string()));
        }

        let count = self.catalog.apis.count_by_integration(integration_id).await?;
        if count > 0 {
            return Err(Error::AssociatedApisFound {
                integration_id: integration_id.to_string(),
                count,
            });
        }

        self.integrations.delete(integration_id).await?;
        info!("Deleted integration '{integration_id}'");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::error::Error;
    use crate::model::{FederatedApi, LifecycleState};
    use crate::retract::RetractionSummary;
    use crate::store::ApiStore;

    fn a_stored_api(uid: &str, lifecycle: Option<LifecycleState>) -> FederatedApi {
        let mut api = FederatedApi::from_external(
            &an_external_api(uid),
            ENVIRONMENT_ID,
            INTEGRATION_ID,
            instant_now(),
        );
        api.lifecycle_state = lifecycle;
        api
    }

    #[tokio::test]
    async fn test_returns_the_accounting_triple() {
        let harness = Harness::new();
        harness
            .apis
            .create(&a_stored_api("uid-1", Some(LifecycleState::Unpublished)))
            .await
            .unwrap();
        harness
            .apis
            .create(&a_stored_api("uid-2", Some(LifecycleState::Published)))
            .await
            .unwrap();
        harness
            .apis
            .create(&a_stored_api("uid-3", None))
            .await
            .unwrap();

        let summary = harness
            .service()
            .delete_ingested_apis(INTEGRATION_ID, &actor())
            .await
            .unwrap();

        assert_eq!(
            summary,
            RetractionSummary {
                deleted: 1,
                skipped: 1,
                errors: 1
            }
        );
        assert_eq!(harness.apis.storage().len(), 2);
    }

    #[tokio::test]
    async fn test_retraction_requires_entitlement() {
        let harness = Harness::new().without_entitlement();
        harness
            .apis
            .create(&a_stored_api("uid-1", Some(LifecycleState::Unpublished)))
            .await
            .unwrap();

        let err = harness
            .service()
            .delete_ingested_apis(INTEGRATION_ID, &actor())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotAllowed { .. }));
        assert_eq!(harness.apis.storage().len(), 1);
        assert!(harness.audit.storage().is_empty());
    }

    #[tokio::test]
    async fn test_delete_integration_refuses_while_apis_remain() {
        let harness = Harness::new();
        harness
            .apis
            .create(&a_stored_api("uid-1", Some(LifecycleState::Unpublished)))
            .await
            .unwrap();

        let err = harness
            .service()
            .delete_integration(INTEGRATION_ID, &actor())
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::AssociatedApisFound { count: 1, ref integration_id } if integration_id == INTEGRATION_ID)
        );
        assert_eq!(harness.integrations.storage().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_integration_not_found() {
        let harness = Harness::new();
        let err = harness
            .service()
            .delete_integration("unknown", &actor())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IntegrationNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_integration_succeeds_once_catalog_is_clean() {
        let harness = Harness::new();
        harness
            .service()
            .delete_integration(INTEGRATION_ID, &actor())
            .await
            .unwrap();
        assert!(harness.integrations.storage().is_empty());
    }
}
