//! Ingestion router, documentation/site/video ingesters, and the chunking
//! algorithm for the knowledge-extraction pipeline (spec §4.2, §4.3).

pub mod chunking;
pub mod collaborators;
pub mod crawler;
pub mod documentation;
pub mod node;
pub mod router;
pub mod source_type;
pub mod tokenizer;
pub mod url_exploration;
pub mod video;

pub use chunking::{ChunkDraft, ChunkingOptions};
pub use crawler::{CrawlOptions, CrawlReport, CrawledPage, QueueDiscipline};
pub use router::{RouterContext, RouterReport, SourceInput};
pub use source_type::{detect_source_type, SourceType};
pub use url_exploration::UrlExplorationNode;

/// `pipeline_types::chunk::ChunkType` re-exported under the path this
/// crate's own operations (source detection, chunking, routing) speak of it
/// by: the canonical type lives in `pipeline-types` since `ContentChunk`
/// needs it too, and `pipeline-types` cannot depend back on this crate.
pub mod chunk_type {
    pub use pipeline_types::chunk::{ChunkKind, ChunkType};
}
