//! Orchestrating use cases
//!
//! [`FederationService`] composes the agent, the license gate, the job
//! tracker, and the two pipelines into the four externally callable
//! operations, split by responsibility:
//! - [`discovery`] - diff preview of what an integration exposes
//! - [`ingestion`] - job creation and batch application
//! - [`retraction`] - retracting ingested APIs and deleting integrations
//!
//! Each operation returns a future; suspension points are exactly the
//! collaborator calls.

use std::sync::Arc;

use crate::agent::IntegrationAgent;
use crate::clock::SharedClock;
use crate::config::FederationConfig;
use crate::identity::SharedIdGenerator;
use crate::ingest::UpsertPipeline;
use crate::license::LicenseService;
use crate::retract::RetractionPipeline;
use crate::store::{
    CatalogStores, IntegrationStore, JobStore, NotificationTrigger, SettingsStore,
};

mod discovery;
mod ingestion;
mod retraction;

pub use ingestion::StartIngestOutcome;

/// Entry point of the federation engine.
pub struct FederationService {
    config: FederationConfig,
    integrations: Arc<dyn IntegrationStore>,
    jobs: Arc<dyn JobStore>,
    agent: Arc<dyn IntegrationAgent>,
    license: Arc<dyn LicenseService>,
    catalog: CatalogStores,
    upsert: UpsertPipeline,
    retraction: RetractionPipeline,
    clock: SharedClock,
    ids: SharedIdGenerator,
}

impl FederationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: FederationConfig,
        integrations: Arc<dyn IntegrationStore>,
        jobs: Arc<dyn JobStore>,
        agent: Arc<dyn IntegrationAgent>,
        license: Arc<dyn LicenseService>,
        catalog: CatalogStores,
        settings: Arc<dyn SettingsStore>,
        notifications: Arc<dyn NotificationTrigger>,
        clock: SharedClock,
        ids: SharedIdGenerator,
    ) -> Self {
        let upsert = UpsertPipeline::new(
            catalog.clone(),
            settings,
            clock.clone(),
            ids.clone(),
        );
        let retraction = RetractionPipeline::new(
            catalog.clone(),
            notifications,
            clock.clone(),
            ids.clone(),
        );
        Self {
            config,
            integrations,
            jobs,
            agent,
            license,
            catalog,
            upsert,
            retraction,
            clock,
            ids,
        }
    }
}
