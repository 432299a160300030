//! Pure state transition function
//!
//! Given the same state, message, name and selector, `transition` always
//! produces the same lines and next state. Nothing here performs I/O.

use super::proactive::{self, Silence, FALLBACK_MESSAGE};
use super::selector::LineSelector;
use super::state::{ConversationState, Phase, Turn};
use super::{closing, greeting, structure, tasks, topic};

/// Used when the caller does not know the user's name
pub const DEFAULT_USER_NAME: &str = "friend";

/// Silence re-enters the normal path with a synthetic reply at most this often
const MAX_REENTRY: u32 = 1;

/// Per-turn inputs shared by every phase handler
#[derive(Clone, Copy)]
pub struct TurnContext<'a> {
    /// Lower-cased, trimmed user message
    pub message: &'a str,
    pub user_name: &'a str,
    pub selector: &'a dyn LineSelector,
}

impl std::fmt::Debug for TurnContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnContext")
            .field("message", &self.message)
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}

/// Lower-case and trim, the form every detector expects
pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

/// Process one turn. An empty message means the user stayed silent.
pub fn transition(
    state: &ConversationState,
    raw_message: &str,
    user_name: &str,
    selector: &dyn LineSelector,
) -> Turn {
    if state.phase.is_terminal() {
        return Turn::new(state.clone());
    }

    let user_name = match user_name.trim() {
        "" => DEFAULT_USER_NAME,
        name => name,
    };

    let mut current = state.clone();
    let mut message = normalize(raw_message);
    let mut depth = 0;

    while message.is_empty() {
        match proactive::advance(&current, selector) {
            Silence::Nudge(turn) => {
                tracing::debug!(
                    phase = %turn.new_state.phase,
                    proactive_count = turn.new_state.proactive_count,
                    "Nudging silent user"
                );
                return turn;
            }
            Silence::Resume(resumed) => {
                depth += 1;
                if depth > MAX_REENTRY {
                    tracing::warn!(phase = %resumed.phase, "Silence re-entry limit reached");
                    return Turn::new(resumed);
                }
                current = resumed;
                message = FALLBACK_MESSAGE.to_string();
            }
        }
    }

    let ctx = TurnContext {
        message: &message,
        user_name,
        selector,
    };
    let mut turn = dispatch(&current, &ctx);
    turn.new_state.proactive_count = 0;

    tracing::debug!(
        from = %current.phase,
        to = %turn.new_state.phase,
        step = turn.new_state.step,
        lines = turn.responses.len(),
        "Transition"
    );

    turn
}

fn dispatch(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    match state.phase {
        Phase::Greeting => greeting::greeting(state, ctx),
        Phase::TopicList => topic::topic_list(state, ctx),
        Phase::TopicPreference => topic::topic_preference(state, ctx),
        Phase::TopicChoose => topic::topic_choose(state, ctx),
        Phase::TopicDebate => topic::topic_debate(state, ctx),
        Phase::TopicConfirm => topic::topic_confirm(state),
        Phase::StructureIntro => structure::structure_intro(state),
        Phase::StructureCauses => structure::structure_causes(state, ctx),
        Phase::StructureEffects => structure::structure_effects(state, ctx),
        Phase::StructureSolutions => structure::structure_solutions(state, ctx),
        Phase::StructureConfirm => structure::structure_confirm(state),
        Phase::TaskClaim => tasks::task_claim(state, ctx),
        Phase::TaskAsk => tasks::task_ask(state, ctx),
        Phase::TaskRespond => tasks::task_respond(state, ctx),
        Phase::TaskSummary => tasks::task_summary(state, ctx),
        Phase::Ending => closing::ending(state),
        Phase::Done => Turn::new(state.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::selector::FixedSelector;
    use crate::state_machine::state::{ChosenBy, Line, Speaker, TaskName};

    fn step(state: &ConversationState, message: &str) -> Turn {
        transition(state, message, "Sam", &FixedSelector(0))
    }

    #[test]
    fn test_start_from_greeting() {
        let turn = step(&ConversationState::new(), "Yes let's start");
        assert_eq!(
            turn.responses,
            vec![Line::new(
                Speaker::Alex,
                "Alright! So we need to pick a topic for our group presentation."
            )]
        );
        assert_eq!(turn.new_state, ConversationState::at(Phase::TopicList));
    }

    #[test]
    fn test_favourite_topic_settles_immediately() {
        let turn = step(&ConversationState::at(Phase::TopicChoose), "Procrastination");
        assert_eq!(turn.responses.len(), 3);
        let speakers: Vec<_> = turn.responses.iter().map(|l| l.speaker).collect();
        assert_eq!(speakers, vec![Speaker::Alex, Speaker::Leo, Speaker::Bella]);
        assert_eq!(turn.new_state.phase, Phase::TopicConfirm);
        assert_eq!(
            turn.new_state.chosen_topic.as_deref(),
            Some("Procrastination")
        );
    }

    #[test]
    fn test_pair_claim_from_task_claim() {
        let turn = step(
            &ConversationState::at(Phase::TaskClaim),
            "I'll take the conclusion and solutions",
        );
        assert_eq!(turn.new_state.phase, Phase::TaskSummary);
        let expected = [
            (TaskName::Intro, "Alex"),
            (TaskName::Causes, "Bella"),
            (TaskName::Effects, "Leo"),
            (TaskName::Solutions, "Sam"),
            (TaskName::Conclusion, "Sam"),
        ];
        assert_eq!(turn.new_state.tasks.len(), 5);
        for (task, who) in expected {
            assert_eq!(turn.new_state.tasks[&task], who);
        }
    }

    #[test]
    fn test_silence_nudges_once_then_acts_as_ok() {
        let first = step(&ConversationState::new(), "");
        assert_eq!(first.responses.len(), 1);
        assert_eq!(first.responses[0].speaker, Speaker::Alex);
        assert_eq!(first.new_state.proactive_count, 1);

        let second = step(&first.new_state, "   ");
        assert_eq!(second, step(&ConversationState::new(), "ok"));
    }

    #[test]
    fn test_real_message_resets_nudge_count() {
        let state = ConversationState {
            proactive_count: 1,
            ..ConversationState::at(Phase::TopicList)
        };
        let turn = step(&state, "hmm");
        assert_eq!(turn.new_state.proactive_count, 0);
    }

    #[test]
    fn test_done_is_absorbing() {
        let state = ConversationState {
            step: 4,
            chosen_topic: Some("Procrastination".to_string()),
            chosen_by: Some(ChosenBy::Team),
            ..ConversationState::at(Phase::Done)
        };
        for message in ["", "hello", "intro please"] {
            let turn = step(&state, message);
            assert!(turn.responses.is_empty());
            assert_eq!(turn.new_state, state);
        }
    }

    #[test]
    fn test_small_talk_at_maximum_step() {
        let state = ConversationState {
            step: u32::MAX,
            ..ConversationState::at(Phase::Greeting)
        };
        let turn = step(&state, "hi");
        assert_eq!(turn.responses.len(), 1);
        assert_eq!(turn.new_state.phase, Phase::Greeting);
        assert_eq!(turn.new_state.step, u32::MAX);
    }

    #[test]
    fn test_blank_name_falls_back() {
        let turn = transition(
            &ConversationState::at(Phase::TaskAsk),
            "ok",
            "  ",
            &FixedSelector(0),
        );
        assert!(turn.responses[0].text.starts_with("So friend,"));
    }

    #[test]
    fn test_full_happy_path_reaches_done() {
        let mut state = ConversationState::new();
        let script = [
            "let's start",
            "ok",
            "ok",
            "ok",
            "ok",
            "procrastination",
        ];
        for message in script {
            state = step(&state, message).new_state;
        }
        assert_eq!(state.chosen_topic.as_deref(), Some("Procrastination"));

        let mut turns = 0;
        while !state.phase.is_terminal() {
            state = step(&state, "ok").new_state;
            turns += 1;
            assert!(turns < 100, "stuck in {}", state.phase);
        }
        assert!(state.tasks.is_empty());
    }
}
