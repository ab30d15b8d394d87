//! In-memory store implementations
//!
//! Reference implementations of the persistence traits, backed by mutexed
//! maps. They power the engine's own tests and are handy for embedders'
//! suites; none of them is meant for production storage.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    ApiKeyStore, ApiStore, AuditStore, IntegrationStore, JobStore, MembershipStore, MetadataStore,
    NotificationTrigger, PageStore, PlanStore, SearchIndexer, SettingsStore, SubscriptionStore,
};
use crate::error::{Error, Result};
use crate::model::{
    ApiKey, AuditEntry, DocumentationPage, FederatedApi, FederatedPlan, IngestionJob, Integration,
    Membership, PageType, PrimaryOwnerMode, Subscription,
};

/// Integrations keyed by id.
#[derive(Default)]
pub struct InMemoryIntegrations {
    items: Mutex<HashMap<String, Integration>>,
}

impl InMemoryIntegrations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, integration: Integration) -> Self {
        self.items
            .lock()
            .unwrap()
            .insert(integration.id.clone(), integration);
        self
    }

    pub fn storage(&self) -> Vec<Integration> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl IntegrationStore for InMemoryIntegrations {
    async fn find_by_id(&self, id: &str) -> Result<Option<Integration>> {
        Ok(self.items.lock().unwrap().get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Ingestion jobs keyed by id.
#[derive(Default)]
pub struct InMemoryJobs {
    items: Mutex<HashMap<String, IngestionJob>>,
}

impl InMemoryJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, job: IngestionJob) -> Self {
        self.items.lock().unwrap().insert(job.id.clone(), job);
        self
    }

    pub fn storage(&self) -> Vec<IngestionJob> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl JobStore for InMemoryJobs {
    async fn find_by_id(&self, id: &str) -> Result<Option<IngestionJob>> {
        Ok(self.items.lock().unwrap().get(id).cloned())
    }

    async fn create(&self, job: &IngestionJob) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn update(&self, job: &IngestionJob) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        if !items.contains_key(&job.id) {
            return Err(Error::store(format!("job '{}' does not exist", job.id)));
        }
        items.insert(job.id.clone(), job.clone());
        Ok(())
    }
}

/// Federated APIs keyed by id.
#[derive(Default)]
pub struct InMemoryApis {
    items: Mutex<HashMap<String, FederatedApi>>,
    /// Error injected for the next write, consumed on use
    fail_next_write: Mutex<Option<String>>,
}

impl InMemoryApis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, api: FederatedApi) -> Self {
        self.items.lock().unwrap().insert(api.id.clone(), api);
        self
    }

    /// Make the next create/update fail, for partial-failure tests.
    pub fn fail_next_write(&self, message: &str) {
        *self.fail_next_write.lock().unwrap() = Some(message.to_string());
    }

    pub fn storage(&self) -> Vec<FederatedApi> {
        self.items.lock().unwrap().values().cloned().collect()
    }

    fn take_failure(&self) -> Option<Error> {
        self.fail_next_write.lock().unwrap().take().map(Error::Store)
    }
}

#[async_trait]
impl ApiStore for InMemoryApis {
    async fn find_by_id(&self, id: &str) -> Result<Option<FederatedApi>> {
        Ok(self.items.lock().unwrap().get(id).cloned())
    }

    async fn find_by_integration(&self, integration_id: &str) -> Result<Vec<FederatedApi>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|api| api.origin.integration_id() == Some(integration_id))
            .cloned()
            .collect())
    }

    async fn count_by_integration(&self, integration_id: &str) -> Result<usize> {
        Ok(self.find_by_integration(integration_id).await?.len())
    }

    async fn create(&self, api: &FederatedApi) -> Result<()> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.items
            .lock()
            .unwrap()
            .insert(api.id.clone(), api.clone());
        Ok(())
    }

    async fn update(&self, api: &FederatedApi) -> Result<()> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut items = self.items.lock().unwrap();
        if !items.contains_key(&api.id) {
            return Err(Error::store(format!("api '{}' does not exist", api.id)));
        }
        items.insert(api.id.clone(), api.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Plans keyed by id.
#[derive(Default)]
pub struct InMemoryPlans {
    items: Mutex<HashMap<String, FederatedPlan>>,
}

impl InMemoryPlans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, plan: FederatedPlan) -> Self {
        self.items.lock().unwrap().insert(plan.id.clone(), plan);
        self
    }

    pub fn storage(&self) -> Vec<FederatedPlan> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlans {
    async fn find_by_id(&self, id: &str) -> Result<Option<FederatedPlan>> {
        Ok(self.items.lock().unwrap().get(id).cloned())
    }

    async fn find_by_api(&self, api_id: &str) -> Result<Vec<FederatedPlan>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|plan| plan.api_id == api_id)
            .cloned()
            .collect())
    }

    async fn create(&self, plan: &FederatedPlan) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .insert(plan.id.clone(), plan.clone());
        Ok(())
    }

    async fn update(&self, plan: &FederatedPlan) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        if !items.contains_key(&plan.id) {
            return Err(Error::store(format!("plan '{}' does not exist", plan.id)));
        }
        items.insert(plan.id.clone(), plan.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Pages keyed by id.
#[derive(Default)]
pub struct InMemoryPages {
    items: Mutex<HashMap<String, DocumentationPage>>,
}

impl InMemoryPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, page: DocumentationPage) -> Self {
        self.items.lock().unwrap().insert(page.id.clone(), page);
        self
    }

    pub fn storage(&self) -> Vec<DocumentationPage> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl PageStore for InMemoryPages {
    async fn find_by_reference_and_type(
        &self,
        reference_id: &str,
        page_type: PageType,
    ) -> Result<Option<DocumentationPage>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .find(|page| page.reference_id == reference_id && page.page_type == page_type)
            .cloned())
    }

    async fn find_by_reference(&self, reference_id: &str) -> Result<Vec<DocumentationPage>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|page| page.reference_id == reference_id)
            .cloned()
            .collect())
    }

    async fn create(&self, page: &DocumentationPage) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .insert(page.id.clone(), page.clone());
        Ok(())
    }

    async fn update(&self, page: &DocumentationPage) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        if !items.contains_key(&page.id) {
            return Err(Error::store(format!("page '{}' does not exist", page.id)));
        }
        items.insert(page.id.clone(), page.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Subscriptions keyed by id.
#[derive(Default)]
pub struct InMemorySubscriptions {
    items: Mutex<HashMap<String, Subscription>>,
}

impl InMemorySubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, subscription: Subscription) -> Self {
        self.items
            .lock()
            .unwrap()
            .insert(subscription.id.clone(), subscription);
        self
    }

    pub fn storage(&self) -> Vec<Subscription> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptions {
    async fn find_by_api(&self, api_id: &str) -> Result<Vec<Subscription>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|sub| sub.api_id == api_id)
            .cloned()
            .collect())
    }

    async fn update(&self, subscription: &Subscription) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .insert(subscription.id.clone(), subscription.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.lock().unwrap().remove(id);
        Ok(())
    }
}

/// API keys keyed by id.
#[derive(Default)]
pub struct InMemoryApiKeys {
    items: Mutex<HashMap<String, ApiKey>>,
}

impl InMemoryApiKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: ApiKey) -> Self {
        self.items.lock().unwrap().insert(key.id.clone(), key);
        self
    }

    pub fn storage(&self) -> Vec<ApiKey> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeys {
    async fn find_by_subscription(&self, subscription_id: &str) -> Result<Vec<ApiKey>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|key| key.subscription_id == subscription_id)
            .cloned()
            .collect())
    }

    async fn update(&self, key: &ApiKey) -> Result<()> {
        self.items.lock().unwrap().insert(key.id.clone(), key.clone());
        Ok(())
    }
}

/// Metadata rows as `(reference_id, key)` pairs.
#[derive(Default)]
pub struct InMemoryMetadata {
    items: Mutex<Vec<(String, String)>>,
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, reference_id: &str, key: &str) -> Self {
        self.items
            .lock()
            .unwrap()
            .push((reference_id.to_string(), key.to_string()));
        self
    }

    pub fn storage(&self) -> Vec<(String, String)> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadata {
    async fn delete_by_reference(&self, reference_id: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .retain(|(reference, _)| reference != reference_id);
        Ok(())
    }
}

/// Memberships keyed by id.
#[derive(Default)]
pub struct InMemoryMemberships {
    items: Mutex<HashMap<String, Membership>>,
}

impl InMemoryMemberships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, membership: Membership) -> Self {
        self.items
            .lock()
            .unwrap()
            .insert(membership.id.clone(), membership);
        self
    }

    pub fn storage(&self) -> Vec<Membership> {
        self.items.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMemberships {
    async fn create(&self, membership: &Membership) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .insert(membership.id.clone(), membership.clone());
        Ok(())
    }

    async fn delete_by_reference(&self, reference_id: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .retain(|_, membership| membership.reference_id != reference_id);
        Ok(())
    }
}

/// Append-only audit log preserving insertion order.
#[derive(Default)]
pub struct InMemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAudit {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Search index recording what is currently indexed.
#[derive(Default)]
pub struct InMemoryIndexer {
    apis: Mutex<HashMap<String, FederatedApi>>,
    pages: Mutex<HashMap<String, DocumentationPage>>,
}

impl InMemoryIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api(self, api: FederatedApi) -> Self {
        self.apis.lock().unwrap().insert(api.id.clone(), api);
        self
    }

    pub fn indexed_apis(&self) -> Vec<FederatedApi> {
        self.apis.lock().unwrap().values().cloned().collect()
    }

    pub fn indexed_pages(&self) -> Vec<DocumentationPage> {
        self.pages.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl SearchIndexer for InMemoryIndexer {
    async fn index_api(&self, api: &FederatedApi) -> Result<()> {
        self.apis.lock().unwrap().insert(api.id.clone(), api.clone());
        Ok(())
    }

    async fn remove_api(&self, api_id: &str) -> Result<()> {
        self.apis.lock().unwrap().remove(api_id);
        Ok(())
    }

    async fn index_page(&self, page: &DocumentationPage) -> Result<()> {
        self.pages
            .lock()
            .unwrap()
            .insert(page.id.clone(), page.clone());
        Ok(())
    }

    async fn remove_pages(&self, reference_id: &str) -> Result<()> {
        self.pages
            .lock()
            .unwrap()
            .retain(|_, page| page.reference_id != reference_id);
        Ok(())
    }
}

/// Per-environment settings with a configurable primary-owner mode.
pub struct InMemorySettings {
    modes: Mutex<HashMap<String, PrimaryOwnerMode>>,
    default_mode: PrimaryOwnerMode,
}

impl Default for InMemorySettings {
    fn default() -> Self {
        Self {
            modes: Mutex::new(HashMap::new()),
            default_mode: PrimaryOwnerMode::User,
        }
    }
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(self, environment_id: &str, mode: PrimaryOwnerMode) -> Self {
        self.modes
            .lock()
            .unwrap()
            .insert(environment_id.to_string(), mode);
        self
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn primary_owner_mode(&self, environment_id: &str) -> Result<PrimaryOwnerMode> {
        Ok(self
            .modes
            .lock()
            .unwrap()
            .get(environment_id)
            .copied()
            .unwrap_or(self.default_mode))
    }
}

/// Notification hook recording every trigger.
#[derive(Default)]
pub struct InMemoryNotifications {
    closed: Mutex<Vec<(String, String)>>,
    failing: Mutex<bool>,
}

impl InMemoryNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every trigger fail, to prove failures are swallowed.
    pub fn failing(self) -> Self {
        *self.failing.lock().unwrap() = true;
        self
    }

    /// `(api_id, application_id)` pairs seen so far.
    pub fn closed_subscriptions(&self) -> Vec<(String, String)> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationTrigger for InMemoryNotifications {
    async fn subscription_closed(&self, api_id: &str, application_id: &str) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(Error::store("notification channel down"));
        }
        self.closed
            .lock()
            .unwrap()
            .push((api_id.to_string(), application_id.to_string()));
        Ok(())
    }
}
