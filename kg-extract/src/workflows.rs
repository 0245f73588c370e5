//! The Workflows extractor (spec §4.4): LLM. Each workflow has ordered steps
//! with `action, screen, precondition, postcondition, error_handling`.

use pipeline_types::chunk::ContentChunk;
use pipeline_types::workflow_entity::{OperationalWorkflow, WorkflowStep};
use serde::Deserialize;

use crate::common::{dedup_by_normalized_name, strip_markdown, ExtractionOutcome, ExtractionScope};
use crate::llm::{extract_json, ChatClient, ChatRequest, LlmError};

const SYSTEM_PROMPT: &str = "You identify end-to-end operational workflows in documentation or walkthrough text. \
Respond with a single JSON object: {\"workflows\": [{\"name\": str, \"business_function\": str, \"steps\": \
[{\"order\": int, \"description\": str, \"action\": str, \"screen\": str, \"precondition\": str, \
\"postcondition\": str, \"error_handling\": str}]}]}. Number steps starting at 1 with no gaps.";

#[derive(Debug, Deserialize)]
struct RawStep {
    order: u32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    screen: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflow {
    name: String,
    #[serde(default)]
    business_function: String,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
struct WorkflowsResponse {
    #[serde(default)]
    workflows: Vec<RawWorkflow>,
}

fn to_workflow(raw: RawWorkflow, scope: &ExtractionScope) -> OperationalWorkflow {
    let mut steps: Vec<WorkflowStep> = raw
        .steps
        .into_iter()
        .enumerate()
        .map(|(index, s)| WorkflowStep {
            step_id: format!("step-{}", index + 1),
            order: s.order,
            description: strip_markdown(&s.description),
            screen_id: s.screen,
            action_id: s.action,
        })
        .collect();
    steps.sort_by_key(|s| s.order);

    let entity_id = format!("workflow-{}", crate::common::normalize_name(&raw.name).replace(' ', "-"));
    OperationalWorkflow {
        envelope: scope.envelope(entity_id),
        name: raw.name,
        business_function: raw.business_function,
        business_function_id: None,
        steps,
        screen_ids: Vec::new(),
        task_ids: Vec::new(),
        action_ids: Vec::new(),
        transition_ids: Vec::new(),
    }
}

pub async fn extract_workflows(
    chunks: &[ContentChunk],
    scope: &ExtractionScope,
    llm: &dyn ChatClient,
) -> ExtractionOutcome<OperationalWorkflow> {
    if chunks.is_empty() {
        return ExtractionOutcome { entities: Vec::new(), errors: Vec::new(), success: true };
    }

    let user_prompt = chunks.iter().map(|c| format!("[{}]\n{}\n", c.chunk_type, c.content)).collect::<Vec<_>>().join("\n");
    let request = ChatRequest { system_prompt: SYSTEM_PROMPT.to_string(), user_prompt, expect_json_object: true };

    let response = match llm.complete(&request).await {
        Ok(response) => response,
        Err(err) => return llm_failure_outcome(err),
    };
    let value = match extract_json(&response.content) {
        Ok(value) => value,
        Err(err) => return llm_failure_outcome(err),
    };
    let parsed: WorkflowsResponse = match serde_json::from_value(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            return ExtractionOutcome {
                entities: Vec::new(),
                errors: vec![format!("workflows response failed schema validation: {err}")],
                success: false,
            }
        }
    };

    let workflows: Vec<OperationalWorkflow> = parsed.workflows.into_iter().map(|raw| to_workflow(raw, scope)).collect();
    let deduped = dedup_by_normalized_name(workflows, |w| w.name.as_str());
    ExtractionOutcome { entities: deduped, errors: Vec::new(), success: true }
}

fn llm_failure_outcome(err: LlmError) -> ExtractionOutcome<OperationalWorkflow> {
    ExtractionOutcome { entities: Vec::new(), errors: vec![err.to_string()], success: false }
}
