//! The LLM chat-completion collaborator (spec §4.4 step 3, §6 LLM
//! contracts): a black-box trait plus an in-memory test double, and the
//! primary/secondary fallback + lenient JSON extraction every LLM-based
//! extractor builds on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider}: {message}")]
    Failed { provider: &'static str, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Respected when the backend supports it (spec §6 LLM contracts:
    /// "respect an explicit response_format: json_object hint when
    /// available").
    pub expect_json_object: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
}

/// Chat completion returning a JSON object (spec §6 LLM contracts). A real
/// implementation would wrap an HTTP client for a specific provider; tests
/// and the extractor bank run against [`doubles::InMemoryChatClient`].
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// Wraps a primary and secondary [`ChatClient`], falling back to the
/// secondary on any primary failure (network, parse, schema violation —
/// spec §4.4 step 3). Both clients see the same request; the caller does not
/// need to know which one answered.
pub struct FallbackChatClient {
    primary: std::sync::Arc<dyn ChatClient>,
    secondary: std::sync::Arc<dyn ChatClient>,
}

impl FallbackChatClient {
    pub fn new(primary: std::sync::Arc<dyn ChatClient>, secondary: std::sync::Arc<dyn ChatClient>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl ChatClient for FallbackChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        match self.primary.complete(request).await {
            Ok(response) => Ok(response),
            Err(primary_err) => {
                tracing::warn!(error = %primary_err, "primary LLM failed, falling back to secondary");
                self.secondary.complete(request).await
            }
        }
    }
}

/// Lenient JSON extraction (spec §4.4 step 3): try the response verbatim,
/// then a ` ```...``` ` fenced block, then the first balanced `{...}` span.
pub fn extract_json(raw: &str) -> Result<serde_json::Value, LlmError> {
    let fail = || LlmError::Failed {
        provider: "json_extract",
        message: format!("no valid JSON object found in response: {raw}"),
    };

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw.trim()) {
        return Ok(value);
    }

    if let Some(fenced) = extract_fenced_block(raw) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(fenced.trim()) {
            return Ok(value);
        }
    }

    if let Some(span) = extract_first_brace_span(raw) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(span) {
            return Ok(value);
        }
    }

    Err(fail())
}

fn extract_fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after_open = &raw[start + 3..];
    let after_open = after_open.strip_prefix("json").unwrap_or(after_open);
    let end = after_open.find("```")?;
    Some(&after_open[..end])
}

/// First balanced `{...}` span, tolerant of braces nested inside string
/// literals so a JSON value containing `{` in prose text doesn't truncate
/// the match early.
fn extract_first_brace_span(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let start = raw.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

pub mod doubles {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// Serves canned responses keyed by an exact match on `user_prompt`, or
    /// a single `default` response when no exact match exists. Returns
    /// [`LlmError`] when asked to simulate a provider outage via
    /// `fail_always`.
    pub struct InMemoryChatClient {
        provider: &'static str,
        responses: RwLock<HashMap<String, String>>,
        default_response: RwLock<Option<String>>,
        fail_always: std::sync::atomic::AtomicBool,
    }

    impl InMemoryChatClient {
        pub fn new(provider: &'static str) -> Self {
            Self {
                provider,
                responses: RwLock::new(HashMap::new()),
                default_response: RwLock::new(None),
                fail_always: std::sync::atomic::AtomicBool::new(false),
            }
        }

        pub async fn seed(&self, prompt: impl Into<String>, response: impl Into<String>) {
            self.responses.write().await.insert(prompt.into(), response.into());
        }

        pub async fn seed_default(&self, response: impl Into<String>) {
            *self.default_response.write().await = Some(response.into());
        }

        pub fn set_fail_always(&self, fail: bool) {
            self.fail_always.store(fail, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ChatClient for InMemoryChatClient {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
            if self.fail_always.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(LlmError::Failed {
                    provider: self.provider,
                    message: "simulated outage".to_string(),
                });
            }
            if let Some(response) = self.responses.read().await.get(&request.user_prompt) {
                return Ok(ChatResponse { content: response.clone() });
            }
            if let Some(response) = self.default_response.read().await.as_ref() {
                return Ok(ChatResponse { content: response.clone() });
            }
            Err(LlmError::Failed {
                provider: self.provider,
                message: "no response seeded for prompt".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_parses_verbatim_object() {
        let value = extract_json(r#"{"screens": []}"#).unwrap();
        assert_eq!(value["screens"], serde_json::json!([]));
    }

    #[test]
    fn extract_json_parses_fenced_block() {
        let raw = "Here is the result:\n```json\n{\"tasks\": [1, 2]}\n```\nThanks.";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["tasks"], serde_json::json!([1, 2]));
    }

    #[test]
    fn extract_json_parses_first_brace_span_amid_prose() {
        let raw = "Sure! {\"actions\": [{\"name\": \"click\"}]} Let me know if you need more.";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["actions"][0]["name"], "click");
    }

    #[test]
    fn extract_json_rejects_non_json_text() {
        assert!(extract_json("no json here at all").is_err());
    }

    #[tokio::test]
    async fn fallback_client_uses_secondary_on_primary_failure() {
        let primary = std::sync::Arc::new(doubles::InMemoryChatClient::new("primary"));
        primary.set_fail_always(true);
        let secondary = std::sync::Arc::new(doubles::InMemoryChatClient::new("secondary"));
        secondary.seed_default(r#"{"ok": true}"#).await;

        let client = FallbackChatClient::new(primary, secondary);
        let response = client
            .complete(&ChatRequest {
                system_prompt: "sys".to_string(),
                user_prompt: "anything".to_string(),
                expect_json_object: true,
            })
            .await
            .unwrap();
        assert_eq!(response.content, r#"{"ok": true}"#);
    }
}
