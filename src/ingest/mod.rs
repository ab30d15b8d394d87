//! Ingestion: discovery diffing and catalog convergence

pub mod batch;
pub mod differ;
pub mod upsert;

pub use batch::for_each_bounded;
pub use differ::{DiffState, DiscoveredApi, classify};
pub use upsert::{IngestSummary, ItemOutcome, UpsertPipeline};
