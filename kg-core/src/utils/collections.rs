//! Small collection-construction helpers shared across the crate.

use rustc_hash::FxHashMap;
use serde_json::Value;

/// Constructs an empty extra-channel map with the crate's hasher.
#[must_use]
pub fn new_extra_map() -> FxHashMap<String, Value> {
    FxHashMap::default()
}
