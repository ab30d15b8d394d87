//! Integration records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured connection to an external API-providing system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub environment_id: String,
    pub name: String,

    /// Provider kind, e.g. `"aws-api-gateway"` or `"solace"`
    pub provider: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
