use serde_json::json;
use pipeline_core::utils::collections::new_extra_map;
use pipeline_core::utils::json_ext::{MergeStrategy, deep_merge, get_by_path, has_structure};

#[test]
fn test_new_extra_map_starts_empty() {
    let mut map = new_extra_map();
    assert!(map.is_empty());

    map.insert("name".to_string(), json!("test"));
    map.insert("count".to_string(), json!(42));

    assert_eq!(map.get("name"), Some(&json!("test")));
    assert_eq!(map.get("count"), Some(&json!(42)));
}

#[test]
fn test_json_ext_deep_merge_and_path() {
    let left = json!({"a": 1, "b": {"x": 10}});
    let right = json!({"b": {"y": 20}, "c": 3});
    let merged = deep_merge(&left, &right, MergeStrategy::DeepMerge).unwrap();
    assert_eq!(merged, json!({"a":1, "b": {"x":10, "y":20}, "c":3}));

    assert_eq!(get_by_path(&merged, "b.x"), Some(&json!(10)));
    assert!(has_structure(&merged, &["a", "b", "c"]));
    assert!(!has_structure(&merged, &["a", "missing"]));
}

#[test]
fn test_json_ext_prefer_left_and_right() {
    let left = json!({"a": 1});
    let right = json!({"a": 2});

    let prefer_left = deep_merge(&left, &right, MergeStrategy::PreferLeft).unwrap();
    assert_eq!(prefer_left, json!({"a": 1}));

    let prefer_right = deep_merge(&left, &right, MergeStrategy::PreferRight).unwrap();
    assert_eq!(prefer_right, json!({"a": 2}));
}

#[test]
fn test_json_ext_fail_on_conflict() {
    let left = json!({"a": 1});
    let right = json!({"a": "not a number"});
    let result = deep_merge(&left, &right, MergeStrategy::FailOnConflict);
    assert!(result.is_err());
}
