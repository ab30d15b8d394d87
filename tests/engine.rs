//! End-to-end engine tests over the in-memory collaborators
//!
//! Drives the full lifecycle the way an embedding management plane would:
//! discover, start a job, apply batches, re-ingest with changes, retract,
//! and finally delete the integration.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use fedbridge::agent::InMemoryIntegrationAgent;
use fedbridge::clock::FixedClock;
use fedbridge::config::FederationConfig;
use fedbridge::identity::SequenceGenerator;
use fedbridge::license::InMemoryLicense;
use fedbridge::model::{
    AuditActor, AuditEvent, ExternalApi, ExternalPage, ExternalPageType, ExternalPlan, Integration,
    JobStatus, LifecycleState, PlanType,
};
use fedbridge::service::FederationService;
use fedbridge::store::{ApiStore, CatalogStores};
use fedbridge::store::memory::{
    InMemoryApiKeys, InMemoryApis, InMemoryAudit, InMemoryIndexer, InMemoryIntegrations,
    InMemoryJobs, InMemoryMemberships, InMemoryMetadata, InMemoryNotifications, InMemoryPages,
    InMemoryPlans, InMemorySettings, InMemorySubscriptions,
};
use fedbridge::{DiffState, RetractionSummary};

const INTEGRATION_ID: &str = "integration-id";
const ORGANIZATION_ID: &str = "organization-id";
const ENVIRONMENT_ID: &str = "environment-id";
const USER_ID: &str = "user-id";

fn instant_now() -> DateTime<Utc> {
    "2023-10-22T10:15:30Z".parse().unwrap()
}

fn actor() -> AuditActor {
    AuditActor::new(ORGANIZATION_ID, ENVIRONMENT_ID, USER_ID)
}

fn an_integration() -> Integration {
    Integration {
        id: INTEGRATION_ID.to_string(),
        environment_id: ENVIRONMENT_ID.to_string(),
        name: "aws east".to_string(),
        provider: "aws-api-gateway".to_string(),
        created_at: instant_now(),
        updated_at: instant_now(),
    }
}

fn an_external_api(uid: &str, name: &str) -> ExternalApi {
    ExternalApi {
        external_unique_id: uid.to_string(),
        external_asset_id: format!("asset-{uid}"),
        name: name.to_string(),
        description: "discovered upstream".to_string(),
        version: Some("1.0.0".to_string()),
        connection_details: BTreeMap::from([(
            "url".to_string(),
            "https://upstream.example.com".to_string(),
        )]),
        plans: vec![ExternalPlan {
            external_plan_id: "default".to_string(),
            name: "Default".to_string(),
            description: "default plan".to_string(),
            plan_type: PlanType::ApiKey,
        }],
        pages: Some(vec![ExternalPage {
            page_type: ExternalPageType::Swagger,
            content: "openapi: 3.0.0".to_string(),
        }]),
    }
}

struct Engine {
    service: FederationService,
    integrations: Arc<InMemoryIntegrations>,
    jobs: Arc<InMemoryJobs>,
    apis: Arc<InMemoryApis>,
    plans: Arc<InMemoryPlans>,
    pages: Arc<InMemoryPages>,
    memberships: Arc<InMemoryMemberships>,
    audit: Arc<InMemoryAudit>,
    indexer: Arc<InMemoryIndexer>,
}

fn build_engine(agent: InMemoryIntegrationAgent, entitled: bool) -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();

    let integrations = Arc::new(InMemoryIntegrations::new().with(an_integration()));
    let jobs = Arc::new(InMemoryJobs::new());
    let apis = Arc::new(InMemoryApis::new());
    let plans = Arc::new(InMemoryPlans::new());
    let pages = Arc::new(InMemoryPages::new());
    let memberships = Arc::new(InMemoryMemberships::new());
    let audit = Arc::new(InMemoryAudit::new());
    let indexer = Arc::new(InMemoryIndexer::new());

    let license = if entitled {
        InMemoryLicense::new().entitle(ORGANIZATION_ID)
    } else {
        InMemoryLicense::new()
    };

    let service = FederationService::new(
        FederationConfig::default(),
        integrations.clone(),
        jobs.clone(),
        Arc::new(agent),
        Arc::new(license),
        CatalogStores {
            apis: apis.clone(),
            plans: plans.clone(),
            pages: pages.clone(),
            subscriptions: Arc::new(InMemorySubscriptions::new()),
            api_keys: Arc::new(InMemoryApiKeys::new()),
            metadata: Arc::new(InMemoryMetadata::new()),
            memberships: memberships.clone(),
            audit: audit.clone(),
            indexer: indexer.clone(),
        },
        Arc::new(InMemorySettings::new()),
        Arc::new(InMemoryNotifications::new()),
        Arc::new(FixedClock::at(instant_now())),
        Arc::new(SequenceGenerator::default()),
    );

    Engine {
        service,
        integrations,
        jobs,
        apis,
        plans,
        pages,
        memberships,
        audit,
        indexer,
    }
}

fn engine_with(agent: InMemoryIntegrationAgent) -> Engine {
    build_engine(agent, true)
}

#[tokio::test]
async fn full_lifecycle_from_discovery_to_ingestion() {
    let catalog = vec![
        an_external_api("uid-1", "orders"),
        an_external_api("uid-2", "inventory"),
    ];
    let engine = engine_with(
        InMemoryIntegrationAgent::new().with_apis(INTEGRATION_ID, catalog.clone()),
    );

    // Discovery: everything is new, nothing mutated.
    let preview = engine
        .service
        .discover(INTEGRATION_ID, &actor())
        .await
        .unwrap();
    assert_eq!(preview.len(), 2);
    assert!(preview.iter().all(|p| p.state == DiffState::New));
    assert!(engine.apis.storage().is_empty());

    // Start: a pending job sized to the discoverable count.
    let outcome = engine
        .service
        .start_ingest(INTEGRATION_ID, &actor())
        .await
        .unwrap();
    assert_eq!(outcome.status, JobStatus::Pending);
    let job = outcome.job.unwrap();
    assert_eq!(job.upper_limit, 2);

    // Apply the batch and finalize.
    let summary = engine
        .service
        .ingest(ORGANIZATION_ID, &job.id, catalog, true)
        .await
        .unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(engine.jobs.storage()[0].status, JobStatus::Success);

    assert_eq!(engine.apis.storage().len(), 2);
    assert_eq!(engine.plans.storage().len(), 2);
    assert_eq!(engine.pages.storage().len(), 2);
    assert_eq!(engine.memberships.storage().len(), 2);
    assert_eq!(engine.indexer.indexed_apis().len(), 2);

    // Re-discovery now previews updates.
    let preview = engine
        .service
        .discover(INTEGRATION_ID, &actor())
        .await
        .unwrap();
    assert!(preview.iter().all(|p| p.state == DiffState::Update));
}

#[tokio::test]
async fn reingestion_renames_api_and_documentation() {
    let engine = engine_with(InMemoryIntegrationAgent::new().with_count(INTEGRATION_ID, 1));

    let job = engine
        .service
        .start_ingest(INTEGRATION_ID, &actor())
        .await
        .unwrap()
        .job
        .unwrap();
    engine
        .service
        .ingest(
            ORGANIZATION_ID,
            &job.id,
            vec![an_external_api("uid-1", "old-name")],
            false,
        )
        .await
        .unwrap();
    assert_eq!(engine.pages.storage()[0].name, "old-name-oas.yml");

    // Same unique id, new name and content.
    let mut renamed = an_external_api("uid-1", "new-name");
    renamed.pages = Some(vec![ExternalPage {
        page_type: ExternalPageType::Swagger,
        content: "openapi: 3.1.0".to_string(),
    }]);
    let summary = engine
        .service
        .ingest(ORGANIZATION_ID, &job.id, vec![renamed], true)
        .await
        .unwrap();
    assert_eq!(summary.updated, 1);

    // One API, renamed in place; its page followed.
    let apis = engine.apis.storage();
    assert_eq!(apis.len(), 1);
    assert_eq!(apis[0].name, "new-name");
    let pages = engine.pages.storage();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].name, "new-name-oas.yml");
    assert_eq!(pages[0].content, "openapi: 3.1.0");

    // API update audited before the page update.
    let events: Vec<AuditEvent> = engine
        .audit
        .storage()
        .iter()
        .map(|entry| entry.event)
        .filter(|event| matches!(event, AuditEvent::ApiUpdated | AuditEvent::PageUpdated))
        .collect();
    assert_eq!(events, vec![AuditEvent::ApiUpdated, AuditEvent::PageUpdated]);
}

#[tokio::test]
async fn retraction_protects_published_apis_and_gates_integration_deletion() {
    let engine = engine_with(InMemoryIntegrationAgent::new().with_count(INTEGRATION_ID, 2));

    let job = engine
        .service
        .start_ingest(INTEGRATION_ID, &actor())
        .await
        .unwrap()
        .job
        .unwrap();
    engine
        .service
        .ingest(
            ORGANIZATION_ID,
            &job.id,
            vec![
                an_external_api("uid-1", "orders"),
                an_external_api("uid-2", "inventory"),
            ],
            true,
        )
        .await
        .unwrap();

    // Publish one of the two.
    let mut published = engine
        .apis
        .storage()
        .into_iter()
        .find(|api| api.name == "orders")
        .unwrap();
    published.lifecycle_state = Some(LifecycleState::Published);
    engine.apis.update(&published).await.unwrap();

    let summary = engine
        .service
        .delete_ingested_apis(INTEGRATION_ID, &actor())
        .await
        .unwrap();
    assert_eq!(
        summary,
        RetractionSummary {
            deleted: 1,
            skipped: 1,
            errors: 0
        }
    );

    // The published API survived, untouched.
    let remaining = engine.apis.storage();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0], published);

    // Integration deletion refuses while it remains...
    let err = engine
        .service
        .delete_integration(INTEGRATION_ID, &actor())
        .await
        .unwrap_err();
    assert!(matches!(err, fedbridge::Error::AssociatedApisFound { .. }));

    // ...then succeeds after the last API is retracted.
    let mut unpublished = remaining.into_iter().next().unwrap();
    unpublished.lifecycle_state = Some(LifecycleState::Unpublished);
    engine.apis.update(&unpublished).await.unwrap();
    engine
        .service
        .delete_ingested_apis(INTEGRATION_ID, &actor())
        .await
        .unwrap();
    engine
        .service
        .delete_integration(INTEGRATION_ID, &actor())
        .await
        .unwrap();
    assert!(engine.integrations.storage().is_empty());
}

#[tokio::test]
async fn license_gate_blocks_every_entry_point_without_side_effects() {
    let engine = build_engine(
        InMemoryIntegrationAgent::new().with_count(INTEGRATION_ID, 5),
        false,
    );

    let service = &engine.service;
    assert!(matches!(
        service.discover(INTEGRATION_ID, &actor()).await,
        Err(fedbridge::Error::NotAllowed { .. })
    ));
    assert!(matches!(
        service.start_ingest(INTEGRATION_ID, &actor()).await,
        Err(fedbridge::Error::NotAllowed { .. })
    ));
    assert!(matches!(
        service
            .ingest(ORGANIZATION_ID, "job", vec![an_external_api("u", "n")], true)
            .await,
        Err(fedbridge::Error::NotAllowed { .. })
    ));
    assert!(matches!(
        service.delete_ingested_apis(INTEGRATION_ID, &actor()).await,
        Err(fedbridge::Error::NotAllowed { .. })
    ));
    assert!(matches!(
        service.delete_integration(INTEGRATION_ID, &actor()).await,
        Err(fedbridge::Error::NotAllowed { .. })
    ));

    // zero side effects anywhere
    assert!(engine.apis.storage().is_empty());
    assert!(engine.jobs.storage().is_empty());
    assert!(engine.audit.storage().is_empty());
    assert!(engine.memberships.storage().is_empty());
}
