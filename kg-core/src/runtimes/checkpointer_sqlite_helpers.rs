//! Small JSON (de)serialization helpers shared by the SQLite checkpointer,
//! factored out so the field-name-annotated error paths stay out of the
//! query logic.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::runtimes::checkpointer::CheckpointerError;

pub(super) fn serialize_json<T: Serialize>(
    value: &T,
    field: &str,
) -> Result<String, CheckpointerError> {
    serde_json::to_string(value).map_err(|e| CheckpointerError::Other {
        message: format!("failed to serialize {field}: {e}"),
    })
}

pub(super) fn deserialize_json(payload: &str, field: &str) -> Result<Value, CheckpointerError> {
    serde_json::from_str(payload).map_err(|e| CheckpointerError::Other {
        message: format!("failed to parse {field} as JSON: {e}"),
    })
}

pub(super) fn deserialize_json_value<T: DeserializeOwned>(
    value: Value,
    field: &str,
) -> Result<T, CheckpointerError> {
    serde_json::from_value(value).map_err(|e| CheckpointerError::Other {
        message: format!("failed to decode {field}: {e}"),
    })
}

pub(super) fn require_json_field(
    value: Option<String>,
    column: &str,
) -> Result<String, CheckpointerError> {
    value.ok_or_else(|| CheckpointerError::Other {
        message: format!("missing column `{column}` in checkpoint row"),
    })
}
