//! The Screens extractor (spec §4.4): rule-based. Walks chunks for section
//! headings and UI-element cues, derives `url_patterns`, builds a state
//! signature distinguishing near-identical screens, rejects low-confidence
//! candidates.

use std::collections::{HashMap, HashSet};

use pipeline_types::chunk::ContentChunk;
use pipeline_types::screen::{Screen, ScreenContentType, StateSignature};
use regex::Regex;

use crate::common::{dedup_by_normalized_name, strip_markdown, ExtractionOutcome, ExtractionScope};

const MIN_CONFIDENCE: f64 = 0.3;

const UI_ELEMENT_CUES: &[&str] = &[
    "button", "field", "form", "menu", "panel", "dialog", "modal", "dropdown", "checkbox", "tab",
    "sidebar", "toolbar", "input", "link", "table", "list",
];

struct Candidate {
    name: String,
    ui_elements: HashSet<String>,
    url_patterns: HashSet<String>,
    content_type: ScreenContentType,
}

fn heading_regex() -> Regex {
    Regex::new(r"(?m)^#{1,6}\s+(.+)$").unwrap()
}

fn url_path_regex() -> Regex {
    Regex::new(r"(?:https?://\S+|/[a-zA-Z0-9_\-/{}]*[a-zA-Z0-9_\-}])").unwrap()
}

fn collect_candidates(chunks: &[ContentChunk]) -> Vec<Candidate> {
    let headings = heading_regex();
    let urls = url_path_regex();
    let mut candidates: HashMap<String, Candidate> = HashMap::new();
    let mut current_name: Option<String> = None;

    for chunk in chunks {
        let content_type = match chunk.chunk_type.kind {
            pipeline_types::chunk::ChunkKind::Webpage | pipeline_types::chunk::ChunkKind::Exploration => {
                ScreenContentType::WebUi
            }
            _ => ScreenContentType::Documentation,
        };

        for line in chunk.content.lines() {
            if let Some(captures) = headings.captures(line) {
                let name = strip_markdown(&captures[1]);
                if name.is_empty() {
                    continue;
                }
                current_name = Some(name.clone());
                candidates.entry(name).or_insert_with(|| Candidate {
                    name: current_name.clone().unwrap(),
                    ui_elements: HashSet::new(),
                    url_patterns: HashSet::new(),
                    content_type,
                });
                continue;
            }

            let Some(name) = current_name.clone() else { continue };
            let Some(candidate) = candidates.get_mut(&name) else { continue };

            let lowered = line.to_lowercase();
            for cue in UI_ELEMENT_CUES {
                if lowered.contains(cue) {
                    candidate.ui_elements.insert((*cue).to_string());
                }
            }
            for matched in urls.find_iter(line) {
                candidate.url_patterns.insert(matched.as_str().to_string());
            }
        }
    }

    candidates.into_values().collect()
}

fn confidence(candidate: &Candidate) -> f64 {
    let ui_score = (candidate.ui_elements.len() as f64 / 3.0).min(0.7);
    let url_score = if candidate.url_patterns.is_empty() { 0.0 } else { 0.3 };
    (ui_score + url_score).min(1.0)
}

/// Rule-based screen extraction (spec §4.4). Always `success = true` unless
/// every candidate fails the confidence floor while at least one candidate
/// was found — a genuinely empty chunk set yields an empty, successful
/// result (the caller applies the spec §7 silent-success rule).
pub fn extract_screens(chunks: &[ContentChunk], scope: &ExtractionScope) -> ExtractionOutcome<Screen> {
    let candidates = collect_candidates(chunks);
    let mut errors = Vec::new();
    let mut accepted: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        if confidence(&candidate) < MIN_CONFIDENCE {
            errors.push(format!("rejected screen candidate '{}': confidence below {MIN_CONFIDENCE}", candidate.name));
            continue;
        }
        accepted.push(candidate);
    }

    let deduped = dedup_by_normalized_name(accepted, |c| c.name.as_str());

    let mut screens = Vec::with_capacity(deduped.len());
    for candidate in &deduped {
        let mut negative_indicators = HashSet::new();
        for other in &deduped {
            if other.name == candidate.name {
                continue;
            }
            for element in &other.ui_elements {
                if !candidate.ui_elements.contains(element) {
                    negative_indicators.insert(element.clone());
                }
            }
        }

        let entity_id = crate::common::normalize_name(&candidate.name).replace(' ', "-");
        let envelope = scope.envelope(entity_id);
        screens.push(Screen {
            envelope,
            name: candidate.name.clone(),
            url_patterns: candidate.url_patterns.iter().cloned().collect(),
            state_signature: StateSignature {
                required_indicators: candidate.ui_elements.iter().cloned().collect(),
                negative_indicators: negative_indicators.into_iter().collect(),
            },
            ui_elements: candidate.ui_elements.iter().cloned().collect(),
            action_ids: Vec::new(),
            task_ids: Vec::new(),
            outgoing_transitions: Vec::new(),
            incoming_transitions: Vec::new(),
            business_function_ids: Vec::new(),
            user_flow_ids: Vec::new(),
            workflow_ids: Vec::new(),
            content_type: candidate.content_type,
            is_actionable: !candidate.ui_elements.is_empty(),
        });
    }

    ExtractionOutcome { entities: screens, errors, success: true }
}
