//! Ingestion dedup contract (spec §4.9): before ingesting a URL or file,
//! hash its content and look up `IngestionMetadata` for the same hash; if
//! present and the source is unchanged, reuse its `ingestion_id` instead of
//! re-ingesting.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionMetadata {
    pub content_hash: String,
    pub source_url: String,
    pub ingestion_id: String,
    pub ingested_at: DateTime<Utc>,
}

#[async_trait]
pub trait IngestionDedupStore: Send + Sync {
    async fn lookup(&self, content_hash: &str) -> Result<Option<IngestionMetadata>, StoreError>;

    /// Records the hash-to-ingestion mapping. A second call with the same
    /// `content_hash` overwrites `ingested_at` but keeps the original
    /// `ingestion_id`, since the id is what downstream chunk references key
    /// off of.
    async fn record(&self, metadata: IngestionMetadata) -> Result<(), StoreError>;
}
