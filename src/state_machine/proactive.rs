//! Keeping the conversation moving when the user goes quiet

use super::selector::{choose, LineSelector};
use super::state::{ConversationState, Phase, Speaker, Turn};

/// Stands in for the user's reply once the nudge went unanswered
pub const FALLBACK_MESSAGE: &str = "ok";

/// Nudges allowed before the fallback reply kicks in
pub const MAX_NUDGES: u32 = 1;

/// What to do about an empty message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Silence {
    /// Prompt the user and wait
    Nudge(Turn),
    /// Answer on the user's behalf with [`FALLBACK_MESSAGE`] from this state
    Resume(ConversationState),
}

const GENERIC: &[(Speaker, &str)] = &[
    (Speaker::Alex, "Anything to add?"),
    (Speaker::Leo, "Take your time, no rush."),
    (Speaker::Alex, "You still there?"),
];

fn filler(phase: Phase, selector: &dyn LineSelector) -> (Speaker, &'static str) {
    match phase {
        Phase::Greeting => (Speaker::Alex, "So, should we start working on the project?"),
        Phase::TopicChoose | Phase::TopicDebate => (Speaker::Alex, "What do you think?"),
        Phase::TaskRespond => (Speaker::Leo, "Causes or Solutions?"),
        _ => *choose(selector, GENERIC),
    }
}

pub fn advance(state: &ConversationState, selector: &dyn LineSelector) -> Silence {
    if state.proactive_count >= MAX_NUDGES {
        return Silence::Resume(ConversationState {
            proactive_count: 0,
            ..state.clone()
        });
    }

    let (speaker, text) = filler(state.phase, selector);
    Silence::Nudge(
        Turn::new(ConversationState {
            proactive_count: state.proactive_count + 1,
            ..state.clone()
        })
        .say(speaker, text),
    )
}
