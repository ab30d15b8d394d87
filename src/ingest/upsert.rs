//! Upsert pipeline
//!
//! Converges one externally discovered API onto the internal catalog: the
//! API aggregate itself, its plans, and its documentation pages, with audit
//! entries, primary-owner assignment, and search indexing on the way.
//! Failures are contained per item; a batch never aborts because one asset
//! is malformed.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::error::Result;
use crate::identity::{SharedIdGenerator, derive_api_id, derive_plan_id};
use crate::ingest::batch::for_each_bounded;
use crate::model::{
    AuditActor, AuditEntry, AuditEvent, DocumentationPage, ExternalApi, FederatedApi,
    FederatedPlan, Membership, PageType,
};
use crate::store::{CatalogStores, SettingsStore};

/// What happened to one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Created,
    Updated,
}

/// Per-run accounting returned to the caller. Failures are data here, not
/// errors: the batch completes even when individual items were skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Creates or updates catalog aggregates from external API descriptions.
pub struct UpsertPipeline {
    catalog: CatalogStores,
    settings: Arc<dyn SettingsStore>,
    clock: SharedClock,
    ids: SharedIdGenerator,
}

impl UpsertPipeline {
    pub fn new(
        catalog: CatalogStores,
        settings: Arc<dyn SettingsStore>,
        clock: SharedClock,
        ids: SharedIdGenerator,
    ) -> Self {
        Self {
            catalog,
            settings,
            clock,
            ids,
        }
    }

    /// Ingest a batch of external APIs with bounded concurrency.
    ///
    /// Items are independent: validation or persistence failures skip the
    /// item, bump the `skipped` counter, and leave the rest of the batch
    /// untouched.
    pub async fn ingest_batch(
        &self,
        items: Vec<ExternalApi>,
        integration_id: &str,
        actor: &AuditActor,
        max_concurrent: usize,
    ) -> IngestSummary {
        let outcomes = for_each_bounded(items, max_concurrent, |item| async move {
            let unique_id = item.external_unique_id.clone();
            (unique_id, self.ingest_one(&item, integration_id, actor).await)
        })
        .await;

        let mut summary = IngestSummary::default();
        for (unique_id, outcome) in outcomes {
            match outcome {
                Ok(ItemOutcome::Created) => summary.created += 1,
                Ok(ItemOutcome::Updated) => summary.updated += 1,
                Err(err) => {
                    warn!("Skipping external api '{unique_id}': {err}");
                    summary.skipped += 1;
                }
            }
        }
        summary
    }

    /// Converge one external API onto the catalog.
    pub async fn ingest_one(
        &self,
        external: &ExternalApi,
        integration_id: &str,
        actor: &AuditActor,
    ) -> Result<ItemOutcome> {
        let api_id = derive_api_id(
            &actor.environment_id,
            integration_id,
            &external.external_unique_id,
        );

        let (api, outcome) = match self.catalog.apis.find_by_id(&api_id).await? {
            None => (
                self.create_api(external, integration_id, actor).await?,
                ItemOutcome::Created,
            ),
            Some(existing) => (
                self.update_api(&existing, external, actor).await?,
                ItemOutcome::Updated,
            ),
        };

        self.upsert_plans(&api, external, actor).await?;
        self.upsert_pages(&api, external, actor).await?;

        Ok(outcome)
    }

    async fn create_api(
        &self,
        external: &ExternalApi,
        integration_id: &str,
        actor: &AuditActor,
    ) -> Result<FederatedApi> {
        let now = self.clock.now();
        let api = FederatedApi::from_external(external, &actor.environment_id, integration_id, now);
        api.validate()?;

        self.catalog.apis.create(&api).await?;
        debug!("Created federated api '{}' from '{}'", api.id, external.external_unique_id);

        // Ingested APIs skip the review workflow entirely; ownership is the
        // only environment policy honored here.
        let mode = self
            .settings
            .primary_owner_mode(&actor.environment_id)
            .await?;
        let membership = if mode.assigns_user() {
            let membership = Membership::primary_owner(
                self.ids.generate(),
                &actor.user_id,
                &actor.organization_id,
                &api.id,
                now,
            );
            self.catalog.memberships.create(&membership).await?;
            Some(membership)
        } else {
            None
        };

        self.catalog
            .audit
            .append(&AuditEntry::new(
                self.ids.generate(),
                actor,
                &api.id,
                AuditEvent::ApiCreated,
                now,
            ))
            .await?;

        if let Some(membership) = membership {
            self.catalog
                .audit
                .append(&AuditEntry::with_properties(
                    self.ids.generate(),
                    actor,
                    &api.id,
                    AuditEvent::MembershipCreated,
                    BTreeMap::from([("USER".to_string(), membership.member_id.clone())]),
                    now,
                ))
                .await?;
        }

        self.catalog.indexer.index_api(&api).await?;
        Ok(api)
    }

    async fn update_api(
        &self,
        existing: &FederatedApi,
        external: &ExternalApi,
        actor: &AuditActor,
    ) -> Result<FederatedApi> {
        let now = self.clock.now();
        let merged = existing.merge_external(external, now);
        merged.validate()?;

        self.catalog.apis.update(&merged).await?;
        debug!("Updated federated api '{}'", merged.id);

        self.catalog
            .audit
            .append(&AuditEntry::new(
                self.ids.generate(),
                actor,
                &merged.id,
                AuditEvent::ApiUpdated,
                now,
            ))
            .await?;

        self.catalog.indexer.index_api(&merged).await?;
        Ok(merged)
    }

    async fn upsert_plans(
        &self,
        api: &FederatedApi,
        external: &ExternalApi,
        actor: &AuditActor,
    ) -> Result<()> {
        for external_plan in &external.plans {
            let now = self.clock.now();
            let plan_id = derive_plan_id(&api.id, &external_plan.external_plan_id);
            match self.catalog.plans.find_by_id(&plan_id).await? {
                None => {
                    let plan = FederatedPlan::from_external(external_plan, &api.id, now);
                    self.catalog.plans.create(&plan).await?;
                    self.append_plan_audit(actor, api, &plan, AuditEvent::PlanCreated, now)
                        .await?;
                }
                Some(existing) => {
                    let merged = existing.merge_external(external_plan, now);
                    self.catalog.plans.update(&merged).await?;
                    self.append_plan_audit(actor, api, &merged, AuditEvent::PlanUpdated, now)
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn append_plan_audit(
        &self,
        actor: &AuditActor,
        api: &FederatedApi,
        plan: &FederatedPlan,
        event: AuditEvent,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        self.catalog
            .audit
            .append(&AuditEntry::with_properties(
                self.ids.generate(),
                actor,
                &api.id,
                event,
                BTreeMap::from([("PLAN".to_string(), plan.id.clone())]),
                now,
            ))
            .await
    }

    async fn upsert_pages(
        &self,
        api: &FederatedApi,
        external: &ExternalApi,
        actor: &AuditActor,
    ) -> Result<()> {
        let Some(pages) = &external.pages else {
            return Ok(());
        };

        for external_page in pages {
            let Some(page_type) = PageType::from_external(external_page.page_type) else {
                debug!(
                    "Ignoring non-ingestable page type {:?} on api '{}'",
                    external_page.page_type, api.id
                );
                continue;
            };

            let now = self.clock.now();
            match self
                .catalog
                .pages
                .find_by_reference_and_type(&api.id, page_type)
                .await?
            {
                None => {
                    let page = DocumentationPage::new(
                        self.ids.generate(),
                        &api.id,
                        &api.name,
                        page_type,
                        &external_page.content,
                        now,
                    );
                    self.catalog.pages.create(&page).await?;
                    self.append_page_audit(actor, api, &page, AuditEvent::PageCreated, now)
                        .await?;
                    self.catalog.indexer.index_page(&page).await?;
                }
                Some(existing) => {
                    // Name is recomputed from the API's current name so a
                    // renamed API renames its pages.
                    let refreshed = existing.refresh(&external_page.content, &api.name, now);
                    self.catalog.pages.update(&refreshed).await?;
                    self.append_page_audit(actor, api, &refreshed, AuditEvent::PageUpdated, now)
                        .await?;
                    self.catalog.indexer.index_page(&refreshed).await?;
                }
            }
        }
        Ok(())
    }

    async fn append_page_audit(
        &self,
        actor: &AuditActor,
        api: &FederatedApi,
        page: &DocumentationPage,
        event: AuditEvent,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        self.catalog
            .audit
            .append(&AuditEntry::with_properties(
                self.ids.generate(),
                actor,
                &api.id,
                event,
                BTreeMap::from([("PAGE".to_string(), page.id.clone())]),
                now,
            ))
            .await
    }
}
