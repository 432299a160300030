//! Optional rewording of scripted lines
//!
//! A polisher may make the teammates sound less canned. It is advisory only:
//! the result must keep the same lines, in the same order, from the same
//! speakers, and anything else is rejected in favour of the originals.

use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::state_machine::{Line, Phase, Speaker};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Shown to the rewriter before a topic is agreed
pub const TOPIC_PLACEHOLDER: &str = "TBD";

/// Below this many characters in total a turn is not worth rewriting
pub const MIN_POLISH_CHARS: usize = 15;

pub const DEFAULT_POLISH_TIMEOUT: Duration = Duration::from_secs(8);

/// What the rewriter gets to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolishRequest {
    pub phase: Phase,
    pub topic: String,
    pub user_message: String,
    pub lines: Vec<Line>,
}

#[derive(Debug, Error)]
pub enum PolishError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("polish timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed polish response: {0}")]
    Malformed(String),
    #[error("expected {expected} lines, got {actual}")]
    CardinalityMismatch { expected: usize, actual: usize },
    #[error("line {index} should be spoken by {expected:?}, got {actual:?}")]
    SpeakerMismatch {
        index: usize,
        expected: Speaker,
        actual: Speaker,
    },
}

/// Rewrites candidate lines
#[async_trait]
pub trait Polisher: Send + Sync {
    async fn polish(&self, request: &PolishRequest) -> Result<Vec<Line>, PolishError>;
}

/// Accept `polished` only if it mirrors `original` line for line
pub fn validate_polished(original: &[Line], polished: Vec<Line>) -> Result<Vec<Line>, PolishError> {
    if polished.len() != original.len() {
        return Err(PolishError::CardinalityMismatch {
            expected: original.len(),
            actual: polished.len(),
        });
    }

    for (index, (before, after)) in original.iter().zip(&polished).enumerate() {
        if before.speaker != after.speaker {
            return Err(PolishError::SpeakerMismatch {
                index,
                expected: before.speaker,
                actual: after.speaker,
            });
        }
        if after.text.trim().is_empty() {
            return Err(PolishError::Malformed(format!("line {index} is empty")));
        }
    }

    Ok(polished
        .into_iter()
        .map(|line| Line::new(line.speaker, line.text.trim()))
        .collect())
}

// ============================================================================
// LLM-backed polisher
// ============================================================================

const POLISH_PROMPT: &str = r#"You are rewriting dialogue for 3 college students to sound more natural and casual.

CHARACTERS:
- Alex: Energetic, uses "like", "honestly", "right?", casual
- Leo: Calm, thoughtful, friendly
- Bella: Quiet, brief (keep her lines SHORT - max 5-6 words)

Rewrite the lines to sound more natural and conversational. Keep the same meaning, the same number of lines and the same speakers in the same order. Keep Bella's lines very short.

Return JSON only:
{"responses": [{"speaker": "alex", "text": "..."}, ...]}"#;

const POLISH_MAX_TOKENS: u32 = 200;
const POLISH_TEMPERATURE: f32 = 0.8;

#[derive(Debug, Deserialize)]
struct PolishedLines {
    responses: Vec<PolishedLine>,
}

#[derive(Debug, Deserialize)]
struct PolishedLine {
    speaker: String,
    text: String,
}

/// Polisher backed by a chat model in JSON mode
pub struct LlmPolisher {
    llm: Arc<dyn LlmService>,
}

impl LlmPolisher {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    fn build_request(request: &PolishRequest) -> LlmRequest {
        let original = request
            .lines
            .iter()
            .map(|line| format!("{}: \"{}\"", line.speaker.display_name().to_lowercase(), line.text))
            .collect::<Vec<_>>()
            .join("\n");

        let context = format!(
            "Phase: {}. Presentation topic: {}. The user just said: \"{}\"",
            request.phase, request.topic, request.user_message
        );

        LlmRequest::with_system(POLISH_PROMPT)
            .user(format!("CONTEXT: {context}\n\nORIGINAL LINES:\n{original}"))
            .max_tokens(POLISH_MAX_TOKENS)
            .temperature(POLISH_TEMPERATURE)
            .json()
    }

    fn parse_response(text: &str) -> Result<Vec<Line>, PolishError> {
        let parsed: PolishedLines =
            serde_json::from_str(text.trim()).map_err(|e| PolishError::Malformed(e.to_string()))?;

        parsed
            .responses
            .into_iter()
            .map(|line| {
                let name = line.speaker.trim();
                [Speaker::Alex, Speaker::Leo, Speaker::Bella]
                    .into_iter()
                    .find(|s| s.display_name().eq_ignore_ascii_case(name))
                    .map(|speaker| Line::new(speaker, line.text))
                    .ok_or_else(|| PolishError::Malformed(format!("unknown speaker {name:?}")))
            })
            .collect()
    }
}

#[async_trait]
impl Polisher for LlmPolisher {
    async fn polish(&self, request: &PolishRequest) -> Result<Vec<Line>, PolishError> {
        let response = self.llm.complete(&Self::build_request(request)).await?;
        let polished = Self::parse_response(&response.text)?;
        validate_polished(&request.lines, polished)
    }
}
