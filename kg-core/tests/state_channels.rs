use serde_json::{Value, json};
use pipeline_core::channels::Channel;
use pipeline_core::progress::{Phase, ProgressEvent};
use pipeline_core::state::PipelineState;

#[test]
fn test_new_initializes_all_channels_at_version_zero() {
    let s = PipelineState::new();
    let snap = s.snapshot();
    assert!(snap.progress.is_empty());
    assert_eq!(snap.progress_version, 0);
    assert!(snap.extra.is_empty());
    assert_eq!(snap.extra_version, 0);
    assert!(snap.errors.is_empty());
    assert_eq!(snap.errors_version, 0);
}

#[test]
fn test_add_progress_appends_without_touching_other_channels() {
    let mut state = PipelineState::new();
    state.add_progress(ProgressEvent::new(Phase::Ingestion, "hello"));
    let snapshot = state.snapshot();

    assert_eq!(snapshot.progress.len(), 1);
    assert_eq!(snapshot.progress[0].current_activity, "hello");
    assert!(snapshot.extra.is_empty());
    assert!(snapshot.errors.is_empty());
}

#[test]
fn test_snapshot_is_deep_copy() {
    let mut s = PipelineState::new();
    s.add_progress(ProgressEvent::new(Phase::Ingestion, "x"));
    let snap = s.snapshot();
    s.progress.get_mut()[0].current_activity = "changed".into();
    s.extra
        .get_mut()
        .insert("k".into(), Value::String("v".into()));
    assert_eq!(snap.progress[0].current_activity, "x");
    assert!(!snap.extra.contains_key("k"));
}

#[test]
fn test_extra_flexible_types() {
    let mut s = PipelineState::new();
    s.add_extra("number", json!(123));
    s.add_extra("text", json!("abc"));
    s.add_extra("array", json!([1, 2, 3]));
    let snap = s.snapshot();
    assert_eq!(snap.extra["number"], json!(123));
    assert_eq!(snap.extra["text"], json!("abc"));
    assert_eq!(snap.extra["array"], json!([1, 2, 3]));
}

#[test]
fn test_clone_is_deep() {
    let mut s = PipelineState::new();
    s.add_progress(ProgressEvent::new(Phase::Ingestion, "msg"));
    s.add_extra("k1", Value::String("v1".into()));
    let cloned = s.clone();
    s.progress.get_mut()[0].current_activity = "changed".into();
    s.add_extra("k2", Value::String("v2".into()));
    assert_ne!(cloned.progress.snapshot(), s.progress.snapshot());
    assert_ne!(cloned.extra.snapshot(), s.extra.snapshot());
    assert_eq!(cloned.progress.snapshot()[0].current_activity, "msg");
    assert_eq!(
        cloned.extra.snapshot().get("k1"),
        Some(&Value::String("v1".into()))
    );
    assert!(!cloned.extra.snapshot().contains_key("k2"));
}

#[test]
fn test_builder_seeds_progress_and_extra_at_version_one() {
    let state = PipelineState::builder()
        .with_progress_event(ProgressEvent::new(Phase::Ingestion, "fetch"))
        .with_progress_event(ProgressEvent::new(Phase::Extraction, "parse"))
        .with_extra("knowledge_id", json!("kg_123"))
        .with_extra("job_id", json!("job_1"))
        .build();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.progress.len(), 2);
    assert_eq!(snapshot.progress[0].current_activity, "fetch");
    assert_eq!(snapshot.progress[1].current_activity, "parse");
    assert_eq!(snapshot.progress_version, 1);

    assert_eq!(snapshot.extra.len(), 2);
    assert_eq!(snapshot.extra.get("knowledge_id"), Some(&json!("kg_123")));
    assert_eq!(snapshot.extra.get("job_id"), Some(&json!("job_1")));
    assert_eq!(snapshot.extra_version, 1);
}

#[test]
fn test_builder_seeds_error_channel() {
    use pipeline_core::channels::errors::ErrorEvent;

    let state = PipelineState::builder()
        .with_error_event(ErrorEvent::default())
        .build();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.errors.len(), 1);
    assert_eq!(snapshot.errors_version, 1);
}

#[test]
fn test_add_extra_and_add_progress_chain() {
    let mut state = PipelineState::new();
    state
        .add_progress(ProgressEvent::new(Phase::Ingestion, "initial"))
        .add_progress(ProgressEvent::new(Phase::Ingestion, "followup"))
        .add_extra("key1", json!("value1"))
        .add_extra("key2", json!(42));

    let snapshot = state.snapshot();
    assert_eq!(snapshot.progress.len(), 2);
    assert_eq!(snapshot.progress[1].current_activity, "followup");

    assert_eq!(snapshot.extra.len(), 2);
    assert_eq!(snapshot.extra.get("key1"), Some(&json!("value1")));
    assert_eq!(snapshot.extra.get("key2"), Some(&json!(42)));
}
