//! The Actions extractor (spec §4.4): rule-based pattern match across
//! chunks, plus direct construction from exploration forms (every form field
//! becomes a "fill" action; every form yields a submit action).

use pipeline_ingestion::crawler::ExtractedForm;
use pipeline_types::chunk::ContentChunk;
use pipeline_types::action::Action;
use regex::Regex;

use crate::common::{dedup_by_normalized_name, ExtractionOutcome, ExtractionScope};

struct ActionCue {
    action_type: &'static str,
    verbs: &'static [&'static str],
}

const CUES: &[ActionCue] = &[
    ActionCue { action_type: "click", verbs: &["click", "press", "tap"] },
    ActionCue { action_type: "type", verbs: &["type", "enter", "fill in"] },
    ActionCue { action_type: "select_option", verbs: &["select", "choose"] },
    ActionCue { action_type: "navigate", verbs: &["navigate to", "go to", "open"] },
];

fn sentence_regex() -> Regex {
    Regex::new(r"[^.!?\n]+[.!?]?").unwrap()
}

/// Scans chunk text for imperative sentences matching a known action verb
/// (spec §4.4 Actions: "rule-based pattern match across chunks").
fn extract_text_actions(chunks: &[ContentChunk], scope: &ExtractionScope) -> Vec<Action> {
    let sentences = sentence_regex();
    let mut actions = Vec::new();

    for chunk in chunks {
        for sentence in sentences.find_iter(&chunk.content) {
            let text = sentence.as_str().trim();
            let lowered = text.to_lowercase();
            for cue in CUES {
                if let Some(verb) = cue.verbs.iter().find(|v| lowered.contains(**v)) {
                    let name = text.to_string();
                    let entity_id =
                        format!("action-{}", crate::common::normalize_name(&name).replace([' ', '/'], "-"));
                    actions.push(Action {
                        envelope: scope.envelope(entity_id),
                        name,
                        action_type: cue.action_type.to_string(),
                        category: "extracted".to_string(),
                        target_selector: String::new(),
                        parameters: serde_json::Value::Null,
                        preconditions: Vec::new(),
                        postconditions: Vec::new(),
                        idempotent: cue.action_type != "navigate",
                        reversible_by: None,
                        screen_ids: Vec::new(),
                        transition_ids: Vec::new(),
                        browser_use_action: None,
                        confidence_score: Some(0.5),
                    });
                    let _ = verb;
                    break;
                }
            }
        }
    }

    actions
}

/// Builds "fill" actions for each field of `form`, plus one "submit" action
/// for the form itself (spec §4.4 Actions: "direct construction from
/// exploration forms").
pub fn actions_from_form(form: &ExtractedForm, source_url: &str, scope: &ExtractionScope) -> Vec<Action> {
    let mut actions = Vec::new();

    for field in &form.fields {
        let entity_id = format!("action-fill-{}-{}", crate::common::normalize_name(source_url).replace(['/', ':'], "-"), field.name);
        actions.push(Action {
            envelope: scope.envelope(entity_id),
            name: format!("Fill {}", field.name),
            action_type: "fill".to_string(),
            category: "form_exploration".to_string(),
            target_selector: field.name.clone(),
            parameters: serde_json::json!({ "field_type": field.field_type }),
            preconditions: Vec::new(),
            postconditions: Vec::new(),
            idempotent: true,
            reversible_by: None,
            screen_ids: Vec::new(),
            transition_ids: Vec::new(),
            browser_use_action: Some(serde_json::json!({
                "source": "form_exploration",
                "form_action": form.action,
                "field": field.name,
            })),
            confidence_score: Some(1.0),
        });
    }

    let submit_entity_id =
        format!("action-submit-{}", crate::common::normalize_name(source_url).replace(['/', ':'], "-"));
    actions.push(Action {
        envelope: scope.envelope(submit_entity_id),
        name: format!("Submit form at {source_url}"),
        action_type: "submit".to_string(),
        category: "form_exploration".to_string(),
        target_selector: form.action.clone().unwrap_or_default(),
        parameters: serde_json::json!({ "method": form.method }),
        preconditions: Vec::new(),
        postconditions: Vec::new(),
        idempotent: false,
        reversible_by: None,
        screen_ids: Vec::new(),
        transition_ids: Vec::new(),
        browser_use_action: Some(serde_json::json!({ "source": "form_exploration" })),
        confidence_score: Some(1.0),
    });

    actions
}

pub fn extract_actions(chunks: &[ContentChunk], scope: &ExtractionScope) -> ExtractionOutcome<Action> {
    let actions = extract_text_actions(chunks, scope);
    let deduped = dedup_by_normalized_name(actions, |a| a.name.as_str());
    ExtractionOutcome { entities: deduped, errors: Vec::new(), success: true }
}
