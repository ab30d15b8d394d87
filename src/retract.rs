//! Retraction pipeline
//!
//! The inverse of ingestion: removes federated APIs an integration no longer
//! backs, cascading across subscriptions, plans, pages, metadata,
//! memberships, and the search index. Published APIs are protected and
//! skipped; a record with no lifecycle state counts as an error. Partial
//! success is the expected outcome, reported as counts instead of exceptions.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::error::Result;
use crate::identity::SharedIdGenerator;
use crate::ingest::for_each_bounded;
use crate::model::{AuditActor, AuditEntry, AuditEvent, FederatedApi, LifecycleState};
use crate::store::{CatalogStores, NotificationTrigger};

/// Per-run accounting: the contract callers rely on for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetractionSummary {
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
}

enum Outcome {
    Deleted,
    Skipped,
    Errored,
}

/// Cascading deletion of federated APIs and everything hanging off them.
pub struct RetractionPipeline {
    catalog: CatalogStores,
    notifications: Arc<dyn NotificationTrigger>,
    clock: SharedClock,
    ids: SharedIdGenerator,
}

impl RetractionPipeline {
    pub fn new(
        catalog: CatalogStores,
        notifications: Arc<dyn NotificationTrigger>,
        clock: SharedClock,
        ids: SharedIdGenerator,
    ) -> Self {
        Self {
            catalog,
            notifications,
            clock,
            ids,
        }
    }

    /// Retract every federated API originating from the integration.
    pub async fn retract_all(
        &self,
        integration_id: &str,
        actor: &AuditActor,
        max_concurrent: usize,
    ) -> Result<RetractionSummary> {
        let apis = self.catalog.apis.find_by_integration(integration_id).await?;
        debug!(
            "Retracting {} federated api(s) of integration '{integration_id}'",
            apis.len()
        );

        let outcomes = for_each_bounded(apis, max_concurrent, |api| async move {
            self.retract_one(&api, actor).await
        })
        .await;

        let mut summary = RetractionSummary::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Deleted => summary.deleted += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Errored => summary.errors += 1,
            }
        }
        Ok(summary)
    }

    async fn retract_one(&self, api: &FederatedApi, actor: &AuditActor) -> Outcome {
        match api.lifecycle_state {
            // Published APIs stay; consumers depend on them.
            Some(LifecycleState::Published) => {
                debug!("Skipping published api '{}'", api.id);
                Outcome::Skipped
            }
            None => {
                warn!("Api '{}' has no lifecycle state, not retracting", api.id);
                Outcome::Errored
            }
            Some(_) => match self.cascade_delete(api, actor).await {
                Ok(()) => Outcome::Deleted,
                Err(err) => {
                    warn!("Failed to retract api '{}': {err}", api.id);
                    Outcome::Errored
                }
            },
        }
    }

    /// Ordered sequence of idempotent delete-by-reference operations. There
    /// is no cross-aggregate transaction; a failure leaves earlier steps
    /// committed and is reported through the error counter.
    async fn cascade_delete(&self, api: &FederatedApi, actor: &AuditActor) -> Result<()> {
        for subscription in self.catalog.subscriptions.find_by_api(&api.id).await? {
            if subscription.status.is_active() {
                self.close_subscription(&subscription, api, actor).await?;
            }
            self.catalog.subscriptions.delete(&subscription.id).await?;
        }

        for plan in self.catalog.plans.find_by_api(&api.id).await? {
            self.catalog.plans.delete(&plan.id).await?;
        }

        for page in self.catalog.pages.find_by_reference(&api.id).await? {
            self.catalog.pages.delete(&page.id).await?;
        }
        self.catalog.indexer.remove_pages(&api.id).await?;

        self.catalog.metadata.delete_by_reference(&api.id).await?;
        self.catalog.memberships.delete_by_reference(&api.id).await?;
        self.catalog.indexer.remove_api(&api.id).await?;
        self.catalog.apis.delete(&api.id).await?;

        self.catalog
            .audit
            .append(&AuditEntry::new(
                self.ids.generate(),
                actor,
                &api.id,
                AuditEvent::ApiDeleted,
                self.clock.now(),
            ))
            .await?;

        debug!("Retracted federated api '{}'", api.id);
        Ok(())
    }

    async fn close_subscription(
        &self,
        subscription: &crate::model::Subscription,
        api: &FederatedApi,
        actor: &AuditActor,
    ) -> Result<()> {
        let now = self.clock.now();
        let closed = subscription.close(now);
        self.catalog.subscriptions.update(&closed).await?;

        for key in self
            .catalog
            .api_keys
            .find_by_subscription(&subscription.id)
            .await?
        {
            if !key.revoked {
                self.catalog.api_keys.update(&key.revoke(now)).await?;
            }
        }

        self.catalog
            .audit
            .append(&AuditEntry::with_properties(
                self.ids.generate(),
                actor,
                &api.id,
                AuditEvent::SubscriptionClosed,
                BTreeMap::from([(
                    "APPLICATION".to_string(),
                    subscription.application_id.clone(),
                )]),
                now,
            ))
            .await?;

        // Fire-and-forget: a broken notification channel must not block
        // retraction.
        if let Err(err) = self
            .notifications
            .subscription_closed(&api.id, &subscription.application_id)
            .await
        {
            warn!(
                "Subscription-closed notification failed for '{}': {err}",
                subscription.id
            );
        }
        Ok(())
    }
}
