//! API request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /orchestrate`.
///
/// Read field by field so a mistyped field only loses itself.
#[derive(Debug, Default, PartialEq)]
pub struct OrchestrateRequest {
    pub user_message: String,
    pub conversation_state: Option<Value>,
    pub user_name: Option<String>,
}

impl OrchestrateRequest {
    pub fn from_value(body: &Value) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            user_message: text("userMessage").unwrap_or_default(),
            conversation_state: body.get("conversationState").cloned(),
            user_name: text("userName"),
        }
    }
}

/// Body of `POST /start`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Body of `POST /chat`
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Response for `POST /chat`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Response for `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub polish: bool,
    pub chat: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_orchestrate_request_is_lenient() {
        let req = OrchestrateRequest::from_value(&json!({
            "userMessage": 42,
            "userName": "Sam",
            "conversationState": {"phase": "task_ask"}
        }));
        assert_eq!(req.user_message, "");
        assert_eq!(req.user_name.as_deref(), Some("Sam"));
        assert_eq!(req.conversation_state, Some(json!({"phase": "task_ask"})));

        assert_eq!(
            OrchestrateRequest::from_value(&json!("not an object")),
            OrchestrateRequest::default()
        );
    }
}
