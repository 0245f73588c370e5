//! Ingestion router (spec §4.2): routes each `(url_or_path, name, type?)`
//! tuple to the documentation, site-crawl, or video sub-pipeline, applies
//! the partial-success/all-fail policy, and persists each [`IngestionResult`]
//! immediately through the document store.

use futures_util::stream::{self, StreamExt};
use pipeline_types::chunk::{ChunkKind, ChunkType, ContentChunk, IngestionResult};
use pipeline_types::envelope::{Entity, Envelope};
use pipeline_types::ingestion_meta::{IngestionDedupStore, IngestionMetadata};
use pipeline_types::store::{DocumentStore, DocumentStoreExt, EntityKind};
use sha2::{Digest, Sha256};

use crate::chunking::{ChunkDraft, ChunkingOptions};
use crate::collaborators::{BrowserDriver, CollaboratorError, FrameExtractor, ObjectStore, TranscriptionClient, VisionClient};
use crate::crawler::{self, CrawlOptions};
use crate::documentation::{self, DocumentParser};
use crate::source_type::{detect_source_type, SourceType};
use crate::video::{self, VideoChunkKind};

const MAX_CONCURRENT_SOURCES: usize = 5;

#[derive(Debug, Clone)]
pub struct SourceInput {
    pub url_or_path: String,
    pub name: String,
    pub explicit_type: Option<SourceType>,
}

pub struct RouterContext<'a> {
    pub knowledge_id: String,
    pub job_id: String,
    pub website_id: String,
    pub chunking_options: ChunkingOptions,
    pub crawl_options: CrawlOptions,
    pub document_parser: &'a dyn DocumentParser,
    pub browser: &'a dyn BrowserDriver,
    pub transcription: &'a dyn TranscriptionClient,
    pub frame_extractor: &'a dyn FrameExtractor,
    pub vision: &'a dyn VisionClient,
    pub object_store: &'a dyn ObjectStore,
    pub dedup: &'a dyn IngestionDedupStore,
    pub document_store: &'a dyn DocumentStore,
}

#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub name: String,
    pub result: IngestionResult,
}

#[derive(Debug, Clone, Default)]
pub struct RouterReport {
    pub outcomes: Vec<SourceOutcome>,
    /// Sources with zero chunks produced: reported as failed and skipped
    /// rather than surfaced as a partial-success `IngestionResult`.
    pub skipped: Vec<(String, String)>,
}

impl RouterReport {
    pub fn all_failed(&self) -> bool {
        self.outcomes.is_empty() && !self.skipped.is_empty()
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "html" => "text/html",
        "docx" | "doc" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "rst" => "text/x-rst",
        _ => "text/markdown",
    }
}

fn extension_of(path: &str) -> String {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Reuses a prior `ingestion_id` for unchanged content, otherwise mints one
/// and records it (spec §4.9 ingestion dedup contract).
async fn resolve_ingestion_id(ctx: &RouterContext<'_>, content_hash: &str, source_url: &str) -> String {
    if let Ok(Some(existing)) = ctx.dedup.lookup(content_hash).await {
        let _ = ctx
            .dedup
            .record(IngestionMetadata {
                content_hash: content_hash.to_string(),
                source_url: source_url.to_string(),
                ingestion_id: existing.ingestion_id.clone(),
                ingested_at: chrono::Utc::now(),
            })
            .await;
        return existing.ingestion_id;
    }
    let ingestion_id = uuid::Uuid::new_v4().to_string();
    let _ = ctx
        .dedup
        .record(IngestionMetadata {
            content_hash: content_hash.to_string(),
            source_url: source_url.to_string(),
            ingestion_id: ingestion_id.clone(),
            ingested_at: chrono::Utc::now(),
        })
        .await;
    ingestion_id
}

fn draft_to_chunk(
    draft: &ChunkDraft,
    kind: ChunkType,
    ingestion_id: &str,
    ctx: &RouterContext<'_>,
) -> ContentChunk {
    ContentChunk {
        envelope: Envelope::new(
            format!("{ingestion_id}:{}", draft.chunk_index),
            ctx.knowledge_id.clone(),
            ctx.job_id.clone(),
            ctx.website_id.clone(),
        ),
        chunk_index: draft.chunk_index,
        content: draft.text.clone(),
        token_count: draft.token_count,
        chunk_type: kind,
        section_title: draft.section_title.clone(),
        breadcrumb: draft.breadcrumb.clone(),
        code_block_placeholders: Vec::new(),
    }
}

async fn ingest_documentation_source(
    ctx: &RouterContext<'_>,
    input: &SourceInput,
) -> Result<Vec<ChunkDraft>, CollaboratorError> {
    let path = input.url_or_path.strip_prefix("file://").unwrap_or(&input.url_or_path);
    let raw = std::fs::read(path).map_err(|e| CollaboratorError::Failed {
        provider: "documentation_source",
        message: format!("reading {path}: {e}"),
    })?;
    let extension = extension_of(path);
    let is_pdf = extension == "pdf";
    documentation::ingest_documentation(
        ctx.document_parser,
        &raw,
        content_type_for(&extension),
        &input.name,
        is_pdf,
        &ctx.chunking_options,
    )
    .await
}

fn strip_html_tags(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

async fn ingest_website_source(
    ctx: &RouterContext<'_>,
    input: &SourceInput,
    crawl: bool,
) -> Result<Vec<ChunkDraft>, CollaboratorError> {
    let mut drafts = Vec::new();
    if crawl {
        let report = crawler::crawl(&input.url_or_path, ctx.browser, &ctx.crawl_options, None).await?;
        for page in report.pages {
            let text = strip_html_tags(&page.html);
            drafts.extend(crate::chunking::chunk_document(&text, &page.url, &ctx.chunking_options));
        }
    } else {
        let fetched = ctx.browser.fetch(&input.url_or_path).await?;
        let text = strip_html_tags(&fetched.html);
        drafts.extend(crate::chunking::chunk_document(&text, &input.name, &ctx.chunking_options));
    }
    Ok(drafts)
}

pub async fn ingest_source(ctx: &RouterContext<'_>, input: SourceInput) -> (String, Result<IngestionResult, String>) {
    let source_type = detect_source_type(&input.url_or_path, input.explicit_type);
    let started_at = chrono::Utc::now();

    match source_type {
        SourceType::Video => {
            let outcome = video::ingest_video(
                &input.url_or_path,
                ctx.transcription,
                ctx.frame_extractor,
                ctx.vision,
                ctx.object_store,
                &format!("videos/{}", input.name),
            )
            .await;
            let output = match outcome {
                Ok(output) => output,
                Err(e) => return (input.name.clone(), Err(e.to_string())),
            };
            let content_hash = hash_bytes(input.url_or_path.as_bytes());
            let ingestion_id = resolve_ingestion_id(ctx, &content_hash, &input.url_or_path).await;

            let mut chunk_ids = Vec::new();
            let mut total_tokens = 0u32;
            for (i, draft) in output.chunks.iter().enumerate() {
                let kind = match draft.kind {
                    VideoChunkKind::Transcription => ChunkType::new(ChunkKind::VideoTranscription),
                    VideoChunkKind::FrameAnalysis => ChunkType::new(ChunkKind::VideoFrameAnalysis),
                    VideoChunkKind::Action => ChunkType::new(ChunkKind::VideoAction),
                    VideoChunkKind::Summary => ChunkType::summary_of(ChunkKind::VideoFrameAnalysis),
                };
                let token_count = crate::tokenizer::count_tokens(&draft.text);
                let chunk = ContentChunk {
                    envelope: Envelope::new(
                        format!("{ingestion_id}:{i}"),
                        ctx.knowledge_id.clone(),
                        ctx.job_id.clone(),
                        ctx.website_id.clone(),
                    ),
                    chunk_index: i as u32,
                    content: draft.text.clone(),
                    token_count,
                    chunk_type: kind,
                    section_title: None,
                    breadcrumb: draft.breadcrumb.clone(),
                    code_block_placeholders: Vec::new(),
                };
                total_tokens += token_count;
                if ctx.document_store.save_entity(EntityKind::ContentChunk, &chunk).await.is_ok() {
                    chunk_ids.push(chunk.entity_id().to_string());
                }
            }

            let success = !chunk_ids.is_empty();
            let result = IngestionResult {
                envelope: Envelope::new(
                    ingestion_id.clone(),
                    ctx.knowledge_id.clone(),
                    ctx.job_id.clone(),
                    ctx.website_id.clone(),
                ),
                ingestion_id,
                source_type: source_type.to_string(),
                source_metadata: serde_json::json!({
                    "duration_ms": output.metadata.duration_ms,
                    "width": output.metadata.width,
                    "height": output.metadata.height,
                    "codec": output.metadata.codec,
                    "frames_considered": output.frames_considered,
                    "frames_kept": output.frames_kept,
                    "batches_failed": output.batches_failed,
                }),
                chunk_ids,
                total_tokens,
                errors: if output.transcription_failed {
                    vec!["transcription failed; continued with frames alone".to_string()]
                } else {
                    Vec::new()
                },
                started_at,
                completed_at: Some(chrono::Utc::now()),
                success,
            };
            (input.name.clone(), Ok(result))
        }
        other => {
            let drafts_result = match other {
                SourceType::Documentation => ingest_documentation_source(ctx, &input).await,
                SourceType::Website => ingest_website_source(ctx, &input, true).await,
                SourceType::WebsiteDocumentation => ingest_website_source(ctx, &input, false).await,
                SourceType::Video => unreachable!(),
            };
            let drafts = match drafts_result {
                Ok(drafts) => drafts,
                Err(e) => return (input.name.clone(), Err(e.to_string())),
            };

            let content_hash = hash_bytes(
                drafts
                    .iter()
                    .map(|d| d.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
                    .as_bytes(),
            );
            let ingestion_id = resolve_ingestion_id(ctx, &content_hash, &input.url_or_path).await;

            let kind = match other {
                SourceType::Documentation => ChunkType::new(ChunkKind::Documentation),
                SourceType::Website => ChunkType::new(ChunkKind::Webpage),
                SourceType::WebsiteDocumentation => ChunkType::new(ChunkKind::Documentation),
                SourceType::Video => unreachable!(),
            };

            let mut chunk_ids = Vec::new();
            let mut total_tokens = 0u32;
            for draft in &drafts {
                let chunk = draft_to_chunk(draft, kind, &ingestion_id, ctx);
                total_tokens += chunk.token_count;
                if ctx.document_store.save_entity(EntityKind::ContentChunk, &chunk).await.is_ok() {
                    chunk_ids.push(chunk.entity_id().to_string());
                }
            }

            let success = !chunk_ids.is_empty();
            let result = IngestionResult {
                envelope: Envelope::new(
                    ingestion_id.clone(),
                    ctx.knowledge_id.clone(),
                    ctx.job_id.clone(),
                    ctx.website_id.clone(),
                ),
                ingestion_id,
                source_type: other.to_string(),
                source_metadata: serde_json::json!({ "source": input.url_or_path }),
                chunk_ids,
                total_tokens,
                errors: Vec::new(),
                started_at,
                completed_at: Some(chrono::Utc::now()),
                success,
            };
            (input.name.clone(), Ok(result))
        }
    }
}

/// Routes every source, bounding concurrency to five in flight at a time
/// (spec §4.2 Parallelism), and applies the partial-success policy: a
/// zero-chunk result is reported as failed and skipped rather than persisted
/// as a usable `IngestionResult`.
pub async fn run_router(ctx: &RouterContext<'_>, inputs: Vec<SourceInput>) -> RouterReport {
    let results = stream::iter(inputs.into_iter().map(|input| ingest_source(ctx, input)))
        .buffer_unordered(MAX_CONCURRENT_SOURCES)
        .collect::<Vec<_>>()
        .await;

    let mut report = RouterReport::default();
    for (name, outcome) in results {
        match outcome {
            Ok(result) if result.success => {
                let _ = ctx.document_store.save_entity(EntityKind::IngestionResult, &result).await;
                report.outcomes.push(SourceOutcome { name, result });
            }
            Ok(result) => {
                let _ = ctx.document_store.save_entity(EntityKind::IngestionResult, &result).await;
                report.skipped.push((name, "zero chunks produced".to_string()));
            }
            Err(error) => {
                report.skipped.push((name, error));
            }
        }
    }
    report
}
