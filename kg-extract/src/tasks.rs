//! The Tasks extractor (spec §4.4): LLM + rule. Enforces step linearity (no
//! backward references) and detects loop language, emitting an
//! `iterator_spec`.

use pipeline_types::chunk::ContentChunk;
use pipeline_types::envelope::Envelope;
use pipeline_types::task::{IoSpec, IteratorSpec, IteratorType, Task, TaskStep};
use serde::Deserialize;

use crate::common::{dedup_by_normalized_name, strip_markdown, ExtractionOutcome, ExtractionScope};
use crate::llm::{extract_json, ChatClient, ChatRequest, LlmError};

const SYSTEM_PROMPT: &str = "You extract multi-step procedures (tasks) a user can perform from documentation or walkthrough text. \
Respond with a single JSON object: {\"tasks\": [{\"name\": str, \"description\": str, \"category\": str, \"complexity\": \"low\"|\"medium\"|\"high\", \
\"steps\": [{\"step_id\": str, \"order\": int, \"description\": str}], \"inputs\": [str], \"outputs\": [str]}]}. \
Number steps starting at 1 with no gaps.";

#[derive(Debug, Deserialize)]
struct RawStep {
    step_id: String,
    order: u32,
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default = "default_complexity")]
    complexity: String,
    #[serde(default)]
    steps: Vec<RawStep>,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_complexity() -> String {
    "medium".to_string()
}

#[derive(Debug, Deserialize)]
struct TasksResponse {
    #[serde(default)]
    tasks: Vec<RawTask>,
}

const LOOP_MARKERS: &[(&str, IteratorType)] =
    &[("for each", IteratorType::ForEach), ("while", IteratorType::While), ("until", IteratorType::Until)];

fn detect_iterator(text: &str) -> IteratorSpec {
    let lowered = text.to_lowercase();
    for (marker, kind) in LOOP_MARKERS {
        if lowered.contains(marker) {
            return IteratorSpec {
                iterator_type: *kind,
                collection_selector: None,
                termination_condition: Some(format!("detected loop language: '{marker}'")),
            };
        }
    }
    IteratorSpec::default()
}

fn steps_are_linear(steps: &[TaskStep]) -> bool {
    let mut last_order = 0u32;
    for step in steps {
        if step.order < last_order {
            return false;
        }
        last_order = step.order;
        for pre in &step.preconditions {
            if steps.iter().any(|s| &s.step_id == pre && s.order > step.order) {
                return false;
            }
        }
    }
    true
}

fn to_task(raw: RawTask, scope: &ExtractionScope) -> Task {
    let description = strip_markdown(&raw.description);
    let iterator_spec = detect_iterator(&format!("{} {}", raw.name, description));

    let mut steps: Vec<TaskStep> = raw
        .steps
        .into_iter()
        .map(|s| TaskStep {
            step_id: s.step_id,
            order: s.order,
            step_type: "step".to_string(),
            action: serde_json::json!({ "description": strip_markdown(&s.description) }),
            preconditions: Vec::new(),
            postconditions: Vec::new(),
            required: true,
            can_skip: false,
        })
        .collect();
    steps.sort_by_key(|s| s.order);

    let entity_id = format!("task-{}", crate::common::normalize_name(&raw.name).replace(' ', "-"));
    Task {
        envelope: scope.envelope(entity_id),
        name: raw.name,
        description,
        category: raw.category,
        complexity: raw.complexity,
        steps,
        io_spec: IoSpec { inputs: raw.inputs, outputs: raw.outputs },
        iterator_spec,
        screen_ids: Vec::new(),
        action_ids: Vec::new(),
    }
}

pub async fn extract_tasks(
    chunks: &[ContentChunk],
    scope: &ExtractionScope,
    llm: &dyn ChatClient,
) -> ExtractionOutcome<Task> {
    if chunks.is_empty() {
        return ExtractionOutcome { entities: Vec::new(), errors: Vec::new(), success: true };
    }

    let user_prompt = build_prompt(chunks);
    let request = ChatRequest { system_prompt: SYSTEM_PROMPT.to_string(), user_prompt, expect_json_object: true };

    let response = match llm.complete(&request).await {
        Ok(response) => response,
        Err(err) => return llm_failure_outcome(err),
    };

    let value = match extract_json(&response.content) {
        Ok(value) => value,
        Err(err) => return llm_failure_outcome(err),
    };

    let parsed: TasksResponse = match serde_json::from_value(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            return ExtractionOutcome {
                entities: Vec::new(),
                errors: vec![format!("tasks response failed schema validation: {err}")],
                success: false,
            }
        }
    };

    let mut errors = Vec::new();
    let mut tasks = Vec::new();
    for raw in parsed.tasks {
        let task = to_task(raw, scope);
        if !steps_are_linear(&task.steps) {
            errors.push(format!("task '{}' rejected: steps contain a backward reference", task.name));
            continue;
        }
        tasks.push(task);
    }

    let deduped = dedup_by_normalized_name(tasks, |t| t.name.as_str());
    ExtractionOutcome { entities: deduped, errors, success: true }
}

fn llm_failure_outcome(err: LlmError) -> ExtractionOutcome<Task> {
    ExtractionOutcome { entities: Vec::new(), errors: vec![err.to_string()], success: false }
}

fn build_prompt(chunks: &[ContentChunk]) -> String {
    let mut prompt = String::new();
    for chunk in chunks {
        prompt.push_str(&format!("[{}]\n{}\n\n", chunk.chunk_type, chunk.content));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::doubles::InMemoryChatClient;
    use pipeline_types::chunk::{ChunkKind, ChunkType};

    fn scope() -> ExtractionScope {
        ExtractionScope { website_id: "w1".to_string(), knowledge_id: "k1".to_string(), job_id: "j1".to_string() }
    }

    fn chunk(content: &str) -> ContentChunk {
        ContentChunk {
            envelope: Envelope::new("c1", "k1", "j1", "w1"),
            chunk_index: 0,
            content: content.to_string(),
            token_count: 10,
            chunk_type: ChunkType::new(ChunkKind::Documentation),
            section_title: None,
            breadcrumb: String::new(),
            code_block_placeholders: Vec::new(),
        }
    }

    #[tokio::test]
    async fn parses_tasks_and_detects_loop_language() {
        let llm = InMemoryChatClient::new("test");
        llm.seed_default(
            r#"{"tasks": [{"name": "Bulk import", "description": "For each row in the CSV, validate and insert it.",
            "steps": [{"step_id": "s1", "order": 1, "description": "Read CSV"}, {"step_id": "s2", "order": 2, "description": "Insert row"}]}]}"#,
        )
        .await;
        let outcome = extract_tasks(&[chunk("docs")], &scope(), &llm).await;
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].iterator_spec.iterator_type, IteratorType::ForEach);
    }

    #[tokio::test]
    async fn rejects_tasks_with_backward_step_references() {
        let llm = InMemoryChatClient::new("test");
        llm.seed_default(
            r#"{"tasks": [{"name": "Broken", "steps": [{"step_id": "s2", "order": 2, "description": "b"}, {"step_id": "s1", "order": 1, "description": "a"}]}]}"#,
        )
        .await;
        let outcome = extract_tasks(&[chunk("docs")], &scope(), &llm).await;
        assert!(outcome.entities.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[tokio::test]
    async fn llm_failure_returns_unsuccessful_outcome_not_panic() {
        let llm = InMemoryChatClient::new("test");
        llm.set_fail_always(true);
        let outcome = extract_tasks(&[chunk("docs")], &scope(), &llm).await;
        assert!(!outcome.success);
        assert!(!outcome.errors.is_empty());
    }
}
