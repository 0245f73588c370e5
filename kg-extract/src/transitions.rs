//! The Transitions extractor (spec §4.4): scans for navigational cues; each
//! transition references a source and target screen by name/id.

use pipeline_types::chunk::ContentChunk;
use pipeline_types::screen::Screen;
use pipeline_types::transition::{Transition, TransitionCost, TriggeredBy};
use regex::Regex;

use crate::common::{ExtractionOutcome, ExtractionScope};
use crate::fuzzy::fuzzy_matches;

fn navigation_regex() -> Regex {
    Regex::new(r"(?i)from\s+(?:the\s+)?([A-Za-z][A-Za-z0-9 ]{1,40}?)\s+(?:screen|page)?,?\s*(?:navigate|go|click|proceed)(?:s)?\s+to\s+(?:the\s+)?([A-Za-z][A-Za-z0-9 ]{1,40}?)\s*(?:screen|page)?[.\n]").unwrap()
}

/// Resolves a loosely-written screen name to the fuzzy-closest known
/// [`Screen`], if any.
fn resolve_screen<'a>(name: &str, screens: &'a [Screen]) -> Option<&'a Screen> {
    screens.iter().find(|s| fuzzy_matches(name.trim(), &s.name))
}

/// Rule-based transition extraction. Requires `screens` (already extracted
/// this run) to resolve navigational cues into `from_screen_id`/
/// `to_screen_id`; cues that don't resolve to two distinct known screens are
/// dropped with an error, not silently kept with dangling ids (spec §8
/// invariant: every transition's endpoints resolve under the same
/// `knowledge_id`).
pub fn extract_transitions(
    chunks: &[ContentChunk],
    screens: &[Screen],
    scope: &ExtractionScope,
) -> ExtractionOutcome<Transition> {
    let pattern = navigation_regex();
    let mut transitions = Vec::new();
    let mut errors = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for chunk in chunks {
        for captures in pattern.captures_iter(&chunk.content) {
            let from_name = captures[1].trim();
            let to_name = captures[2].trim();

            let Some(from_screen) = resolve_screen(from_name, screens) else {
                errors.push(format!("transition source screen '{from_name}' not found among extracted screens"));
                continue;
            };
            let Some(to_screen) = resolve_screen(to_name, screens) else {
                errors.push(format!("transition target screen '{to_name}' not found among extracted screens"));
                continue;
            };
            if from_screen.screen_id() == to_screen.screen_id() {
                continue;
            }

            let key = (from_screen.screen_id().to_string(), to_screen.screen_id().to_string());
            if !seen.insert(key) {
                continue;
            }

            let entity_id = format!("transition-{}-{}", from_screen.screen_id(), to_screen.screen_id());
            transitions.push(Transition {
                envelope: scope.envelope(entity_id),
                from_screen_id: from_screen.screen_id().to_string(),
                to_screen_id: to_screen.screen_id().to_string(),
                triggered_by: TriggeredBy { action_type: "navigate".to_string(), element_id: None },
                conditions: Vec::new(),
                cost: TransitionCost { estimated_ms: 0 },
                reliability_score: 0.5,
                action_id: None,
            });
        }
    }

    ExtractionOutcome { entities: transitions, errors, success: true }
}
