//! One conversation turn, end to end
//!
//! Runs the pure transition and then, for eligible turns, offers the lines
//! to the polisher under a hard time budget. The orchestrator keeps no
//! per-session data; concurrent sessions share it freely.

use crate::polish::{
    PolishError, PolishRequest, Polisher, DEFAULT_POLISH_TIMEOUT, MIN_POLISH_CHARS,
    TOPIC_PLACEHOLDER,
};
use crate::state_machine::proactive::FALLBACK_MESSAGE;
use crate::state_machine::{
    opening_lines, transition, ConversationState, Line, LineSelector, Phase, Turn,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

pub struct Orchestrator {
    selector: Arc<dyn LineSelector>,
    polisher: Option<Arc<dyn Polisher>>,
    polish_timeout: Duration,
}

impl Orchestrator {
    pub fn new(selector: Arc<dyn LineSelector>) -> Self {
        Self {
            selector,
            polisher: None,
            polish_timeout: DEFAULT_POLISH_TIMEOUT,
        }
    }

    pub fn with_polisher(mut self, polisher: Arc<dyn Polisher>, budget: Duration) -> Self {
        self.polisher = Some(polisher);
        self.polish_timeout = budget;
        self
    }

    pub fn polishes(&self) -> bool {
        self.polisher.is_some()
    }

    /// Lines the teammates open with and a fresh state
    pub fn opening(&self, user_name: &str) -> Turn {
        Turn::new(ConversationState::new()).with_lines(opening_lines(user_name))
    }

    /// Process one turn. Never fails: polish problems fall back to the
    /// scripted lines.
    pub async fn step(&self, state: &ConversationState, message: &str, user_name: &str) -> Turn {
        let mut turn = transition(state, message, user_name, self.selector.as_ref());

        tracing::debug!(
            from = %state.phase,
            to = %turn.new_state.phase,
            step = turn.new_state.step,
            lines = turn.responses.len(),
            silent = message.trim().is_empty(),
            "Turn complete"
        );

        // A polished silent turn is one that resumed on the user's behalf.
        let driving = if message.trim().is_empty() {
            FALLBACK_MESSAGE
        } else {
            message
        };
        if let Some(polished) = self.polish(state.phase, &turn, driving).await {
            turn.responses = polished;
        }
        turn
    }

    async fn polish(&self, phase: Phase, turn: &Turn, message: &str) -> Option<Vec<Line>> {
        let polisher = self.polisher.as_ref()?;

        let skip = if !phase.is_polishable() {
            Some("phase")
        } else if turn.responses.is_empty() {
            Some("no lines")
        } else if turn.new_state.proactive_count > 0 {
            Some("silence nudge")
        } else if turn.text_len() < MIN_POLISH_CHARS {
            Some("too short")
        } else {
            None
        };
        if let Some(reason) = skip {
            tracing::debug!(phase = %phase, reason, "Polish skipped");
            return None;
        }

        let request = PolishRequest {
            phase,
            topic: turn
                .new_state
                .topic_or(TOPIC_PLACEHOLDER)
                .to_string(),
            user_message: message.to_string(),
            lines: turn.responses.clone(),
        };

        let outcome = timeout(self.polish_timeout, polisher.polish(&request))
            .await
            .unwrap_or(Err(PolishError::Timeout(self.polish_timeout)));

        match outcome {
            Ok(lines) => {
                tracing::debug!(phase = %phase, lines = lines.len(), "Polish applied");
                Some(lines)
            }
            Err(e) => {
                tracing::warn!(phase = %phase, error = %e, "Polish failed, keeping scripted lines");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polish::validate_polished;
    use crate::state_machine::selector::FixedSelector;
    use crate::state_machine::Speaker;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and shouts every line
    #[derive(Default)]
    struct RecordingPolisher {
        seen: Mutex<Vec<PolishRequest>>,
    }

    #[async_trait]
    impl Polisher for RecordingPolisher {
        async fn polish(&self, request: &PolishRequest) -> Result<Vec<Line>, PolishError> {
            self.seen.lock().unwrap().push(request.clone());
            let shouted = request
                .lines
                .iter()
                .map(|l| Line::new(l.speaker, l.text.to_uppercase()))
                .collect();
            validate_polished(&request.lines, shouted)
        }
    }

    struct FailingPolisher;

    #[async_trait]
    impl Polisher for FailingPolisher {
        async fn polish(&self, _request: &PolishRequest) -> Result<Vec<Line>, PolishError> {
            Err(PolishError::Malformed("nope".to_string()))
        }
    }

    struct SlowPolisher;

    #[async_trait]
    impl Polisher for SlowPolisher {
        async fn polish(&self, request: &PolishRequest) -> Result<Vec<Line>, PolishError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(request.lines.clone())
        }
    }

    /// Loses every line, which validation must catch
    struct TruncatingPolisher;

    #[async_trait]
    impl Polisher for TruncatingPolisher {
        async fn polish(&self, request: &PolishRequest) -> Result<Vec<Line>, PolishError> {
            validate_polished(&request.lines, Vec::new())
        }
    }

    fn orchestrator(polisher: Arc<dyn Polisher>) -> Orchestrator {
        Orchestrator::new(Arc::new(FixedSelector(0)))
            .with_polisher(polisher, Duration::from_millis(50))
    }

    fn causes_answer_state() -> ConversationState {
        ConversationState {
            step: 4,
            chosen_topic: Some("Procrastination".to_string()),
            ..ConversationState::at(Phase::StructureCauses)
        }
    }

    #[tokio::test]
    async fn test_eligible_turn_is_polished() {
        let recorder = Arc::new(RecordingPolisher::default());
        let orch = orchestrator(recorder.clone());

        let turn = orch
            .step(&causes_answer_state(), "Fear of failure", "Sam")
            .await;
        assert_eq!(turn.responses[0].text, "GOOD POINT! LET'S ADD THAT.");
        assert_eq!(turn.new_state.phase, Phase::StructureEffects);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].phase, Phase::StructureCauses);
        assert_eq!(seen[0].topic, "Procrastination");
        assert_eq!(seen[0].user_message, "Fear of failure");
    }

    #[tokio::test]
    async fn test_short_turn_never_reaches_polisher() {
        let recorder = Arc::new(RecordingPolisher::default());
        let orch = orchestrator(recorder.clone());

        // "Got it!" is 7 characters
        let state = ConversationState::at(Phase::TaskClaim);
        let turn = orch.step(&state, "causes", "Sam").await;
        assert_eq!(turn.responses, vec![Line::new(Speaker::Leo, "Got it!")]);
        assert!(turn.text_len() < MIN_POLISH_CHARS);
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ineligible_phase_never_reaches_polisher() {
        let recorder = Arc::new(RecordingPolisher::default());
        let orch = orchestrator(recorder.clone());

        let turn = orch
            .step(&ConversationState::new(), "yes let's start", "Sam")
            .await;
        assert_eq!(
            turn.responses[0].text,
            "Alright! So we need to pick a topic for our group presentation."
        );
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nudge_is_not_polished() {
        let recorder = Arc::new(RecordingPolisher::default());
        let orch = orchestrator(recorder.clone());

        let state = ConversationState::at(Phase::TaskRespond);
        let turn = orch.step(&state, "", "Sam").await;
        assert_eq!(turn.responses[0].text, "Causes or Solutions?");
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resumed_silence_is_polished_as_fallback_reply() {
        let recorder = Arc::new(RecordingPolisher::default());
        let orch = orchestrator(recorder.clone());

        let state = ConversationState {
            step: 3,
            proactive_count: 1,
            ..ConversationState::at(Phase::TaskClaim)
        };
        let turn = orch.step(&state, "", "Sam").await;
        assert_eq!(turn.new_state.step, 4);
        assert_eq!(turn.new_state.proactive_count, 0);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].user_message, "ok");
    }

    #[tokio::test]
    async fn test_failures_keep_scripted_lines() {
        let polishers: [Arc<dyn Polisher>; 3] = [
            Arc::new(FailingPolisher),
            Arc::new(SlowPolisher),
            Arc::new(TruncatingPolisher),
        ];
        let expected = transition(
            &causes_answer_state(),
            "fear of failure",
            "Sam",
            &FixedSelector(0),
        );

        for polisher in polishers {
            let turn = orchestrator(polisher)
                .step(&causes_answer_state(), "fear of failure", "Sam")
                .await;
            assert_eq!(turn, expected);
        }
    }

    #[tokio::test]
    async fn test_without_polisher_matches_transition() {
        let orch = Orchestrator::new(Arc::new(FixedSelector(0)));
        assert!(!orch.polishes());
        let turn = orch.step(&causes_answer_state(), "fear of failure", "Sam").await;
        assert_eq!(
            turn,
            transition(&causes_answer_state(), "fear of failure", "Sam", &FixedSelector(0))
        );
    }

    #[test]
    fn test_opening() {
        let orch = Orchestrator::new(Arc::new(FixedSelector(0)));
        let turn = orch.opening("Sam");
        assert_eq!(turn.responses.len(), 3);
        assert_eq!(turn.new_state, ConversationState::new());
    }
}
