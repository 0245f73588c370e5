//! Wraps the ingestion router as the Ingestion-phase [`Node`] the
//! orchestrator's graph drives first (spec §4.1 algorithm step 2).

use std::sync::Arc;

use async_trait::async_trait;
use pipeline_core::node::{Node, NodeContext, NodeError, NodePartial};
use pipeline_core::progress::{Phase, ProgressEvent};
use pipeline_core::state::StateSnapshot;
use pipeline_core::utils::collections::new_extra_map;
use pipeline_types::ingestion_meta::IngestionDedupStore;
use pipeline_types::store::DocumentStore;
use serde::Deserialize;

use crate::chunking::ChunkingOptions;
use crate::collaborators::{BrowserDriver, FrameExtractor, ObjectStore, TranscriptionClient, VisionClient};
use crate::crawler::CrawlOptions;
use crate::documentation::DocumentParser;
use crate::router::{run_router, RouterContext, SourceInput};
use crate::source_type::SourceType;

/// The `(url_or_path, name, type?)` tuple as it arrives in `snapshot.extra`.
#[derive(Debug, Deserialize)]
struct SourceTupleDto {
    url_or_path: String,
    name: String,
    #[serde(default)]
    source_type: Option<String>,
}

fn parse_source_type(raw: &str) -> Option<SourceType> {
    match raw {
        "video" => Some(SourceType::Video),
        "documentation" => Some(SourceType::Documentation),
        "website" => Some(SourceType::Website),
        "website_documentation" => Some(SourceType::WebsiteDocumentation),
        _ => None,
    }
}

fn extract_str(snapshot: &StateSnapshot, key: &'static str) -> Result<String, NodeError> {
    snapshot
        .extra
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(NodeError::MissingInput { what: key })
}

/// Collaborators and stores the ingestion router needs, injected once at
/// construction so the node itself stays a thin adapter over [`run_router`].
pub struct IngestionNode {
    pub document_parser: Arc<dyn DocumentParser>,
    pub browser: Arc<dyn BrowserDriver>,
    pub transcription: Arc<dyn TranscriptionClient>,
    pub frame_extractor: Arc<dyn FrameExtractor>,
    pub vision: Arc<dyn VisionClient>,
    pub object_store: Arc<dyn ObjectStore>,
    pub dedup: Arc<dyn IngestionDedupStore>,
    pub document_store: Arc<dyn DocumentStore>,
    pub chunking_options: ChunkingOptions,
    pub crawl_options: CrawlOptions,
}

#[async_trait]
impl Node for IngestionNode {
    async fn run(&self, snapshot: StateSnapshot, ctx: NodeContext) -> Result<NodePartial, NodeError> {
        let knowledge_id = extract_str(&snapshot, "knowledge_id")?;
        let job_id = extract_str(&snapshot, "job_id")?;
        let website_id = snapshot
            .extra
            .get("website_id")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let sources_value = snapshot
            .extra
            .get("sources")
            .ok_or(NodeError::MissingInput { what: "sources" })?;
        let sources: Vec<SourceTupleDto> = serde_json::from_value(sources_value.clone())?;
        if sources.is_empty() {
            return Err(NodeError::ValidationFailed("no sources supplied to ingestion".to_string()));
        }

        let inputs: Vec<SourceInput> = sources
            .into_iter()
            .map(|s| SourceInput {
                url_or_path: s.url_or_path,
                name: s.name,
                explicit_type: s.source_type.as_deref().and_then(parse_source_type),
            })
            .collect();

        let router_ctx = RouterContext {
            knowledge_id,
            job_id,
            website_id,
            chunking_options: self.chunking_options.clone(),
            crawl_options: self.crawl_options.clone(),
            document_parser: self.document_parser.as_ref(),
            browser: self.browser.as_ref(),
            transcription: self.transcription.as_ref(),
            frame_extractor: self.frame_extractor.as_ref(),
            vision: self.vision.as_ref(),
            object_store: self.object_store.as_ref(),
            dedup: self.dedup.as_ref(),
            document_store: self.document_store.as_ref(),
        };

        ctx.emit_node("ingestion", format!("routing {} source(s)", inputs.len()))?;
        let report = run_router(&router_ctx, inputs).await;

        if report.outcomes.is_empty() {
            return Err(NodeError::ValidationFailed(
                "all ingestion sources failed (spec §4.2 Failure policy)".to_string(),
            ));
        }

        let ingestion_ids: Vec<String> = report.outcomes.iter().map(|o| o.result.ingestion_id.clone()).collect();

        let mut extra = new_extra_map();
        extra.insert("ingestion_ids".to_string(), serde_json::json!(ingestion_ids));
        extra.insert(
            "ingestion_skipped".to_string(),
            serde_json::json!(report.skipped.iter().map(|(n, e)| format!("{n}: {e}")).collect::<Vec<_>>()),
        );

        let progress = ProgressEvent::new(Phase::Ingestion, "ingestion_router")
            .with_items(report.outcomes.len() as u64, None)
            .with_counts(report.outcomes.len() as u64, 0, 0);

        Ok(NodePartial::new().with_progress(vec![progress]).with_extra(extra))
    }
}
