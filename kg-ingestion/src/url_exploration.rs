//! The URL Exploration phase (spec §4.7, optional): re-crawls the live site
//! for any source that carries a real URL, extracting forms the
//! documentation/video sub-pipelines never see, and persists the result
//! tagged `extraction_method: "form_exploration"`. Reuses the BFS crawler
//! the Website ingestion path drives (`crate::crawler`); this phase only
//! differs in which pages it walks (every live source, not just ones routed
//! as `Website`) and in what it does with a page once fetched.
//!
//! Sources with no live URL (bare file paths, `file://` documentation) are
//! skipped — there is nothing to explore.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline_core::node::{Node, NodeContext, NodeError, NodePartial};
use pipeline_core::progress::{Phase, ProgressEvent};
use pipeline_core::state::StateSnapshot;
use pipeline_core::utils::collections::new_extra_map;
use pipeline_types::action::Action;
use pipeline_types::envelope::Envelope;
use pipeline_types::screen::{ScreenContentType, StateSignature};
use pipeline_types::store::{DocumentStore, DocumentStoreExt, EntityKind};
use serde_json::json;
use sha2::{Digest, Sha256};

use scraper::Html;

use crate::collaborators::BrowserDriver;
use crate::crawler::{crawl, extract_forms_raw, CrawlOptions, CrawledPage, ExtractedForm, QueueDiscipline};

fn extract_str(snapshot: &StateSnapshot, key: &'static str) -> Result<String, NodeError> {
    snapshot.extra.get(key).and_then(|v| v.as_str()).map(str::to_string).ok_or(NodeError::MissingInput { what: key })
}

fn slug_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    format!("{prefix}-{}", &hex[..16])
}

fn screen_from_page(
    page: &CrawledPage,
    forms: &[ExtractedForm],
    knowledge_id: &str,
    job_id: &str,
    website_id: &str,
) -> pipeline_types::screen::Screen {
    let entity_id = slug_id("screen", &page.url);
    pipeline_types::screen::Screen {
        envelope: Envelope::new(entity_id, knowledge_id, job_id, website_id),
        name: page.url.clone(),
        url_patterns: vec![page.url.clone()],
        state_signature: StateSignature::default(),
        ui_elements: Vec::new(),
        action_ids: Vec::new(),
        task_ids: Vec::new(),
        outgoing_transitions: Vec::new(),
        incoming_transitions: Vec::new(),
        business_function_ids: Vec::new(),
        user_flow_ids: Vec::new(),
        workflow_ids: Vec::new(),
        content_type: ScreenContentType::WebUi,
        is_actionable: !forms.is_empty(),
    }
}

fn actions_from_page(
    page: &CrawledPage,
    forms: &[ExtractedForm],
    knowledge_id: &str,
    job_id: &str,
    website_id: &str,
    screen_id: &str,
) -> Vec<Action> {
    forms
        .iter()
        .enumerate()
        .map(|(index, form)| {
            let seed = format!("{}#form{index}", page.url);
            let entity_id = slug_id("action", &seed);
            let parameters = json!({
                "method": form.method,
                "action": form.action,
                "fields": form.fields.iter().map(|f| json!({
                    "name": f.name,
                    "type": f.field_type,
                    "inert": f.inert,
                })).collect::<Vec<_>>(),
            });
            Action {
                envelope: Envelope::new(entity_id, knowledge_id, job_id, website_id),
                name: format!("submit form {index} on {}", page.url),
                action_type: "submit_form".to_string(),
                category: "form_exploration".to_string(),
                target_selector: form.action.clone().unwrap_or_else(|| page.url.clone()),
                parameters,
                preconditions: Vec::new(),
                postconditions: Vec::new(),
                idempotent: false,
                reversible_by: None,
                screen_ids: vec![screen_id.to_string()],
                transition_ids: Vec::new(),
                browser_use_action: Some(json!({"extraction_method": "form_exploration"})),
                confidence_score: None,
            }
        })
        .collect()
}

/// One entry of the `sources` array the orchestrator seeds into pipeline
/// state `extra` (spec §4.1 step 1).
struct LiveSource {
    url: String,
}

fn live_sources(snapshot: &StateSnapshot) -> Vec<LiveSource> {
    let Some(sources) = snapshot.extra.get("sources").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    sources
        .iter()
        .filter_map(|entry| entry.get("url_or_path").and_then(|v| v.as_str()))
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .map(|url| LiveSource { url: url.to_string() })
        .collect()
}

fn crawl_options_from(snapshot: &StateSnapshot) -> CrawlOptions {
    let options = snapshot.extra.get("options");
    let max_pages = options
        .and_then(|o| o.get("exploration_max_pages"))
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(CrawlOptions::default().max_pages);
    let max_depth = options
        .and_then(|o| o.get("exploration_max_depth"))
        .and_then(|v| v.as_u64())
        .map(|n| n as u32)
        .unwrap_or(CrawlOptions::default().max_depth);
    CrawlOptions { max_pages, max_depth, discipline: QueueDiscipline::Bfs }
}

/// Optional phase node (spec §4.7): walks every live source's site with the
/// same BFS crawler the Website ingestion path uses, persisting a screen
/// per page and an action per retained form. Runs after the Graph Phase and
/// before Verification in the data flow, and is a no-op when no source
/// carries a live URL.
pub struct UrlExplorationNode {
    pub browser: Arc<dyn BrowserDriver>,
    pub document_store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl Node for UrlExplorationNode {
    async fn run(&self, snapshot: StateSnapshot, ctx: NodeContext) -> Result<NodePartial, NodeError> {
        let knowledge_id = extract_str(&snapshot, "knowledge_id")?;
        let job_id = extract_str(&snapshot, "job_id")?;
        let website_id = snapshot.extra.get("website_id").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();

        let sources = live_sources(&snapshot);
        if sources.is_empty() {
            ctx.emit_node("url_exploration", "no live sources to explore, skipping")?;
            let progress = ProgressEvent::new(Phase::UrlExploration, "skipped_no_live_sources");
            return Ok(NodePartial::new().with_progress(vec![progress]));
        }

        ctx.emit_node("url_exploration", format!("exploring {} live source(s)", sources.len()))?;
        let crawl_options = crawl_options_from(&snapshot);

        let mut screens_persisted = 0u64;
        let mut actions_persisted = 0u64;
        let mut explore_errors = Vec::new();

        for source in &sources {
            let report = match crawl(&source.url, self.browser.as_ref(), &crawl_options, None).await {
                Ok(report) => report,
                Err(err) => {
                    explore_errors.push(format!("{}: {err}", source.url));
                    continue;
                }
            };

            for page in &report.pages {
                let document = Html::parse_document(&page.html);
                let forms = extract_forms_raw(&document);
                let screen = screen_from_page(page, &forms, &knowledge_id, &job_id, &website_id);
                let screen_id = screen.screen_id().to_string();
                let actions = actions_from_page(page, &forms, &knowledge_id, &job_id, &website_id, &screen_id);

                if self.document_store.save_entity(EntityKind::Screen, &screen).await.is_ok() {
                    screens_persisted += 1;
                }
                for action in &actions {
                    if self.document_store.save_entity(EntityKind::Action, action).await.is_ok() {
                        actions_persisted += 1;
                    }
                }
            }
        }

        let mut extra = new_extra_map();
        extra.insert("url_exploration_screens".to_string(), json!(screens_persisted));
        extra.insert("url_exploration_actions".to_string(), json!(actions_persisted));
        extra.insert("url_exploration_errors".to_string(), json!(explore_errors));

        let progress = ProgressEvent::new(Phase::UrlExploration, "form_exploration").with_counts(0, screens_persisted, 0);
        Ok(NodePartial::new().with_progress(vec![progress]).with_extra(extra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::doubles::InMemoryBrowserDriver;
    use crate::collaborators::FetchedPage;
    use pipeline_core::event_bus::EventBus;
    use pipeline_core::state::PipelineState;
    use pipeline_types::memory::InMemoryDocumentStore;

    fn test_ctx() -> (NodeContext, EventBus) {
        let event_bus = EventBus::default();
        event_bus.listen_for_events();
        let ctx = NodeContext { node_id: "url_exploration".to_string(), step: 0, event_emitter: event_bus.get_emitter() };
        (ctx, event_bus)
    }

    fn snapshot_with_source(url: &str) -> StateSnapshot {
        let state = PipelineState::builder()
            .with_extra("knowledge_id", json!("k1"))
            .with_extra("job_id", json!("j1"))
            .with_extra("website_id", json!("example.com"))
            .with_extra("sources", json!([{"url_or_path": url, "name": "n", "source_type": "website"}]))
            .build();
        state.snapshot()
    }

    #[tokio::test]
    async fn skips_when_no_live_source_present() {
        let document_store = Arc::new(InMemoryDocumentStore::new());
        let node = UrlExplorationNode { browser: Arc::new(InMemoryBrowserDriver::new()), document_store };
        let state = PipelineState::builder()
            .with_extra("knowledge_id", json!("k1"))
            .with_extra("job_id", json!("j1"))
            .with_extra("sources", json!([{"url_or_path": "file:///tmp/a.md", "name": "n"}]))
            .build();
        let (ctx, _event_bus) = test_ctx();
        let partial = node.run(state.snapshot(), ctx).await.unwrap();
        assert_eq!(partial.progress.unwrap()[0].current_activity, "skipped_no_live_sources");
    }

    #[tokio::test]
    async fn persists_a_screen_and_action_per_discovered_form() {
        let browser = Arc::new(InMemoryBrowserDriver::new());
        browser.seed(
            "https://example.com/",
            FetchedPage {
                final_url: "https://example.com/".to_string(),
                html: "<html><body><form method=\"post\" action=\"/signup\"><input name=\"email\" type=\"email\"></form></body></html>".to_string(),
                status: 200,
            },
        );
        let document_store = Arc::new(InMemoryDocumentStore::new());
        let node = UrlExplorationNode { browser, document_store: document_store.clone() };

        let (ctx, _event_bus) = test_ctx();
        let partial = node.run(snapshot_with_source("https://example.com/"), ctx).await.unwrap();
        let extra = partial.extra.unwrap();
        assert_eq!(extra.get("url_exploration_screens").and_then(|v| v.as_u64()), Some(1));
        assert_eq!(extra.get("url_exploration_actions").and_then(|v| v.as_u64()), Some(1));

        let screens = document_store
            .query_entities::<pipeline_types::screen::Screen>(EntityKind::Screen, "k1", Some("j1"))
            .await
            .unwrap();
        assert_eq!(screens.len(), 1);
        assert!(screens[0].is_actionable);
    }
}
