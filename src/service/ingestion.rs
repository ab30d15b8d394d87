//! Ingestion use cases
//!
//! `start_ingest` sizes and records the job; `ingest` applies batches the
//! caller pulled from the agent and finalizes the job with the last one.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::FederationService;
use crate::error::{Error, Result};
use crate::ingest::IngestSummary;
use crate::license::require_federation;
use crate::model::{AuditActor, ExternalApi, IngestionJob, JobStatus};

/// What `start_ingest` reports back.
///
/// `job` is `None` when nothing was discoverable and no job was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartIngestOutcome {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<IngestionJob>,
}

impl FederationService {
    /// Kick off an ingestion run for the integration.
    ///
    /// When the agent reports zero discoverable APIs no job record is
    /// created and the outcome is immediately `Success`.
    pub async fn start_ingest(
        &self,
        integration_id: &str,
        actor: &AuditActor,
    ) -> Result<StartIngestOutcome> {
        require_federation(self.license.as_ref(), &actor.organization_id).await?;

        let integration = self
            .integrations
            .find_by_id(integration_id)
            .await?
            .ok_or_else(|| Error::IntegrationNotFound(integration_id.to_string()))?;

        let discoverable = self.agent.count_discoverable(integration_id).await?;
        if discoverable == 0 {
            debug!("Integration '{integration_id}' has nothing to ingest");
            return Ok(StartIngestOutcome {
                status: JobStatus::Success,
                job: None,
            });
        }

        let job = IngestionJob::pending(
            self.ids.generate(),
            integration_id,
            &integration.environment_id,
            &actor.user_id,
            discoverable,
            self.clock.now(),
            self.config.job_deadline(),
        );
        self.jobs.create(&job).await?;
        info!(
            "Started ingestion job '{}' for integration '{integration_id}' ({discoverable} api(s))",
            job.id
        );

        Ok(StartIngestOutcome {
            status: JobStatus::Pending,
            job: Some(job),
        })
    }

    /// Apply one batch of already-fetched external APIs against a job.
    ///
    /// A missing job means it was already consumed or expired: the batch is
    /// silently dropped. With `completed` the job transitions to `Success`
    /// after the batch is applied.
    pub async fn ingest(
        &self,
        organization_id: &str,
        job_id: &str,
        batch: Vec<ExternalApi>,
        completed: bool,
    ) -> Result<IngestSummary> {
        require_federation(self.license.as_ref(), organization_id).await?;

        let Some(job) = self.jobs.find_by_id(job_id).await? else {
            debug!("Ingestion job '{job_id}' not found, dropping batch");
            return Ok(IngestSummary::default());
        };

        // Attribution comes from the job: the environment it targets and the
        // user who started the run.
        let actor = AuditActor::new(organization_id, &job.environment_id, &job.initiator_id);
        let summary = self
            .upsert
            .ingest_batch(
                batch,
                &job.source_id,
                &actor,
                self.config.ingest_concurrency,
            )
            .await;

        if completed {
            self.jobs.update(&job.complete(self.clock.now())).await?;
            info!(
                "Ingestion job '{job_id}' completed: {} created, {} updated, {} skipped",
                summary.created, summary.updated, summary.skipped
            );
        }

        Ok(summary)
    }
}
