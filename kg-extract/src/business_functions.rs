//! The Business Functions extractor (spec §4.4): LLM. Prompt emphasizes
//! extensive multi-paragraph `business_reasoning` and `business_impact`;
//! records `screens_mentioned` for the Post-Extraction Linker.

use pipeline_types::business::{BusinessFunction, RelatedIds};
use pipeline_types::chunk::ContentChunk;
use serde::Deserialize;

use crate::common::{dedup_by_normalized_name, meets_min_length, strip_markdown, ExtractionOutcome, ExtractionScope};
use crate::llm::{extract_json, ChatClient, ChatRequest, LlmError};

const MIN_REQUIREMENT_LEN: usize = 10;

const SYSTEM_PROMPT: &str = "You identify user-visible business functions in documentation or walkthrough text. \
For each, write extensive multi-paragraph `business_reasoning` (why this function exists) and `business_impact` \
(what breaks or is lost without it). Respond with a single JSON object: {\"business_functions\": [{\"name\": str, \
\"category\": str, \"description\": str, \"business_reasoning\": str, \"business_impact\": str, \
\"business_requirements\": [str], \"screens_mentioned\": [str]}]}.";

#[derive(Debug, Deserialize)]
struct RawBusinessFunction {
    name: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    business_reasoning: String,
    #[serde(default)]
    business_impact: String,
    #[serde(default)]
    business_requirements: Vec<String>,
    #[serde(default)]
    screens_mentioned: Vec<String>,
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize)]
struct BusinessFunctionsResponse {
    #[serde(default)]
    business_functions: Vec<RawBusinessFunction>,
}

pub async fn extract_business_functions(
    chunks: &[ContentChunk],
    scope: &ExtractionScope,
    llm: &dyn ChatClient,
) -> ExtractionOutcome<BusinessFunction> {
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
    let parsed: BusinessFunctionsResponse = match serde_json::from_value(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            return ExtractionOutcome {
                entities: Vec::new(),
                errors: vec![format!("business_functions response failed schema validation: {err}")],
                success: false,
            }
        }
    };

    let mut functions = Vec::new();
    let mut errors = Vec::new();
    for raw in parsed.business_functions {
        let business_requirements: Vec<String> = raw
            .business_requirements
            .into_iter()
            .map(|r| strip_markdown(&r))
            .filter(|r| {
                let keep = meets_min_length(r, MIN_REQUIREMENT_LEN);
                if !keep {
                    errors.push(format!("dropped business requirement shorter than {MIN_REQUIREMENT_LEN} chars: '{r}'"));
                }
                keep
            })
            .collect();

        let entity_id = format!("bf-{}", crate::common::normalize_name(&raw.name).replace(' ', "-"));
        functions.push(BusinessFunction {
            envelope: scope.envelope(entity_id),
            name: raw.name,
            category: raw.category,
            description: strip_markdown(&raw.description),
            business_reasoning: raw.business_reasoning,
            business_impact: raw.business_impact,
            business_requirements,
            operational_aspects: Vec::new(),
            workflow_steps: Vec::new(),
            screens_mentioned: raw.screens_mentioned,
            related: RelatedIds::default(),
        });
    }

    let deduped = dedup_by_normalized_name(functions, |f| f.name.as_str());
    ExtractionOutcome { entities: deduped, errors, success: true }
}

fn llm_failure_outcome(err: LlmError) -> ExtractionOutcome<BusinessFunction> {
    ExtractionOutcome { entities: Vec::new(), errors: vec![err.to_string()], success: false }
}

fn build_prompt(chunks: &[ContentChunk]) -> String {
    chunks.iter().map(|c| format!("[{}]\n{}\n", c.chunk_type, c.content)).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::doubles::InMemoryChatClient;
    use pipeline_types::chunk::{ChunkKind, ChunkType};
    use pipeline_types::envelope::Envelope;

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
    async fn short_requirements_are_dropped_with_an_error() {
        let llm = InMemoryChatClient::new("test");
        llm.seed_default(
            r#"{"business_functions": [{"name": "Order fulfillment", "business_reasoning": "Because orders must ship.",
            "business_impact": "Revenue stops.", "business_requirements": ["short", "must support next-day shipping nationwide"]}]}"#,
        )
        .await;
        let outcome = extract_business_functions(&[chunk("docs")], &scope(), &llm).await;
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].business_requirements.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
    }
}
