//! Shared extractor interface (spec §4.4): `(chunks[], website_id,
//! knowledge_id, job_id) → (entities[], errors[], success)`, plus the
//! post-processing steps every extractor applies before persisting.

use std::collections::HashSet;

use pipeline_types::chunk::ContentChunk;
use pipeline_types::envelope::Envelope;
use pipeline_types::store::{DocumentStore, DocumentStoreExt, EntityKind, StoreError};
use serde::Serialize;

/// The four identifiers every extractor call is scoped to.
#[derive(Debug, Clone)]
pub struct ExtractionScope {
    pub website_id: String,
    pub knowledge_id: String,
    pub job_id: String,
}

impl ExtractionScope {
    pub fn envelope(&self, entity_id: impl Into<String>) -> Envelope {
        Envelope::new(entity_id, self.knowledge_id.clone(), self.job_id.clone(), self.website_id.clone())
    }
}

/// `(entities[], errors[], success)` (spec §4.4). `success` is false only
/// when the extractor produced zero entities for reasons other than "source
/// genuinely had none to offer" — callers decide fatality per spec §7 error
/// kind 5 (silent-success is fatal for non-video sources).
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome<T> {
    pub entities: Vec<T>,
    pub errors: Vec<String>,
    pub success: bool,
}

/// Loads every chunk persisted for this job (spec §4.4 step 1: "Loads
/// chunks from all specified ingestion ids, concatenates them"). `ContentChunk`
/// does not carry its own `ingestion_id`, so the job's full chunk set
/// already is the concatenation across that job's ingestions; `chunk_type`
/// remains each chunk's source-type label.
pub async fn load_chunks(
    store: &dyn DocumentStore,
    knowledge_id: &str,
    job_id: &str,
) -> Result<Vec<ContentChunk>, StoreError> {
    store.query_entities::<ContentChunk>(EntityKind::ContentChunk, knowledge_id, Some(job_id)).await
}

/// Strips markdown bullets (`-`, `*`, `+`, digit-dot) and emphasis markers
/// (`**`, `*`, `_`) from one line of extracted text (spec §4.4 step 4).
pub fn strip_markdown(text: &str) -> String {
    let trimmed = text.trim();
    let without_bullet = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
        .unwrap_or(trimmed);
    let without_ordinal = strip_leading_ordinal(without_bullet);
    without_ordinal.replace("**", "").replace('_', "").trim().to_string()
}

fn strip_leading_ordinal(text: &str) -> &str {
    let digits_end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(0);
    if digits_end > 0 {
        if let Some(rest) = text[digits_end..].strip_prefix(". ") {
            return rest;
        }
    }
    text
}

/// Case/whitespace-normalized form used for name-based dedup (spec §4.4 step
/// 4: "deduplicate by normalized name").
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deduplicates `items` by `normalize_name(key(item))`, keeping the first
/// occurrence.
pub fn dedup_by_normalized_name<T>(items: Vec<T>, key: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(normalize_name(key(item))))
        .collect()
}

/// Enforces a minimum string length, returning `None` (to be filtered out or
/// flagged) when `text` is shorter than `min_len` after trimming (spec §4.4
/// step 4, e.g. business requirements ≥ 10 chars).
pub fn meets_min_length(text: &str, min_len: usize) -> bool {
    text.trim().chars().count() >= min_len
}

/// Persists `entities` under `(knowledge_id, job_id)` and returns the ids
/// that were actually saved (spec §4.4 step 5).
pub async fn persist_entities<T>(
    store: &dyn DocumentStore,
    kind: EntityKind,
    entities: &[T],
) -> Vec<String>
where
    T: pipeline_types::envelope::Entity + Serialize + Sync,
{
    let mut saved_ids = Vec::new();
    for entity in entities {
        if store.save_entity(kind, entity).await.is_ok() {
            saved_ids.push(entity.entity_id().to_string());
        }
    }
    saved_ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markdown_removes_bullets_and_emphasis() {
        assert_eq!(strip_markdown("- **Login** screen"), "Login screen");
        assert_eq!(strip_markdown("2. _Checkout_ flow"), "Checkout flow");
    }

    #[test]
    fn normalize_name_folds_case_and_whitespace() {
        assert_eq!(normalize_name("  Login   Screen "), "login screen");
        assert_eq!(normalize_name("Login Screen"), "login screen");
    }

    #[test]
    fn dedup_by_normalized_name_keeps_first_occurrence() {
        let items = vec!["Login Screen".to_string(), "login   screen".to_string(), "Checkout".to_string()];
        let deduped = dedup_by_normalized_name(items, |s| s.as_str());
        assert_eq!(deduped, vec!["Login Screen".to_string(), "Checkout".to_string()]);
    }

    #[test]
    fn meets_min_length_respects_trimming() {
        assert!(!meets_min_length("   short  ", 10));
        assert!(meets_min_length("exactly 10", 10));
    }
}
