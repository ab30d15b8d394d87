//! Engine configuration
//!
//! Tuning knobs for batch concurrency and job deadlines. Embedders usually
//! rely on the defaults; a YAML file can override them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Federation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Maximum number of external APIs ingested concurrently per batch
    #[serde(default = "default_ingest_concurrency")]
    pub ingest_concurrency: usize,

    /// Maximum number of APIs retracted concurrently per run
    #[serde(default = "default_retract_concurrency")]
    pub retract_concurrency: usize,

    /// Seconds an ingestion job stays claimable before it is considered stale
    #[serde(default = "default_job_deadline_secs")]
    pub job_deadline_secs: u64,
}

fn default_ingest_concurrency() -> usize {
    8
}

fn default_retract_concurrency() -> usize {
    4
}

fn default_job_deadline_secs() -> u64 {
    300
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            ingest_concurrency: default_ingest_concurrency(),
            retract_concurrency: default_retract_concurrency(),
            job_deadline_secs: default_job_deadline_secs(),
        }
    }
}

impl FederationConfig {
    /// Load configuration from a YAML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: FederationConfig =
            serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Job deadline as a `Duration`
    pub fn job_deadline(&self) -> Duration {
        Duration::from_secs(self.job_deadline_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.ingest_concurrency == 0 || self.retract_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency limits must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }
}
