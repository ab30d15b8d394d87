//! Persistence collaborator boundary
//!
//! The engine owns no storage. Every aggregate is read and written through
//! one of these traits, keyed by the identities in the model module. The
//! in-memory implementations in [`memory`] back the test suite and give
//! embedders a reference semantics.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    ApiKey, AuditEntry, DocumentationPage, FederatedApi, FederatedPlan, IngestionJob, Integration,
    Membership, PageType, PrimaryOwnerMode, Subscription,
};

pub mod memory;

/// Integration records.
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Integration>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Ingestion job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<IngestionJob>>;
    async fn create(&self, job: &IngestionJob) -> Result<()>;
    async fn update(&self, job: &IngestionJob) -> Result<()>;
}

/// Federated API aggregates.
#[async_trait]
pub trait ApiStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<FederatedApi>>;

    /// All APIs whose origin is the given integration.
    async fn find_by_integration(&self, integration_id: &str) -> Result<Vec<FederatedApi>>;

    async fn count_by_integration(&self, integration_id: &str) -> Result<usize>;
    async fn create(&self, api: &FederatedApi) -> Result<()>;
    async fn update(&self, api: &FederatedApi) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Plans of federated APIs.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<FederatedPlan>>;
    async fn find_by_api(&self, api_id: &str) -> Result<Vec<FederatedPlan>>;
    async fn create(&self, plan: &FederatedPlan) -> Result<()>;
    async fn update(&self, plan: &FederatedPlan) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Documentation pages.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// At most one page exists per `(reference, type)` for ingested APIs.
    async fn find_by_reference_and_type(
        &self,
        reference_id: &str,
        page_type: PageType,
    ) -> Result<Option<DocumentationPage>>;

    async fn find_by_reference(&self, reference_id: &str) -> Result<Vec<DocumentationPage>>;
    async fn create(&self, page: &DocumentationPage) -> Result<()>;
    async fn update(&self, page: &DocumentationPage) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Subscriptions referencing federated APIs.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_by_api(&self, api_id: &str) -> Result<Vec<Subscription>>;
    async fn update(&self, subscription: &Subscription) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// API keys issued under subscriptions.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    async fn find_by_subscription(&self, subscription_id: &str) -> Result<Vec<ApiKey>>;
    async fn update(&self, key: &ApiKey) -> Result<()>;
}

/// Free-form metadata attached to APIs.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn delete_by_reference(&self, reference_id: &str) -> Result<()>;
}

/// Membership records.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn create(&self, membership: &Membership) -> Result<()>;
    async fn delete_by_reference(&self, reference_id: &str) -> Result<()>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<()>;
}

/// Full-text search index over the catalog.
#[async_trait]
pub trait SearchIndexer: Send + Sync {
    async fn index_api(&self, api: &FederatedApi) -> Result<()>;
    async fn remove_api(&self, api_id: &str) -> Result<()>;
    async fn index_page(&self, page: &DocumentationPage) -> Result<()>;
    async fn remove_pages(&self, reference_id: &str) -> Result<()>;
}

/// Per-environment settings consulted during ingestion.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn primary_owner_mode(&self, environment_id: &str) -> Result<PrimaryOwnerMode>;
}

/// Fire-and-forget lifecycle notifications.
///
/// Implementations must not block the pipelines; failures are logged by the
/// caller and never propagated.
#[async_trait]
pub trait NotificationTrigger: Send + Sync {
    async fn subscription_closed(&self, api_id: &str, application_id: &str) -> Result<()>;
}

/// The catalog-side collaborators both pipelines share.
#[derive(Clone)]
pub struct CatalogStores {
    pub apis: Arc<dyn ApiStore>,
    pub plans: Arc<dyn PlanStore>,
    pub pages: Arc<dyn PageStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub audit: Arc<dyn AuditStore>,
    pub indexer: Arc<dyn SearchIndexer>,
}
