//! Sign-off after the task summary

use super::state::{ConversationState, Phase, Speaker, Turn};

pub fn ending(state: &ConversationState) -> Turn {
    match state.step {
        0 => Turn::new(state.next_step()).say(Speaker::Alex, "Sounds good to me!"),
        1 => Turn::new(state.next_step()).say(Speaker::Bella, "Yeah."),
        2 => Turn::new(ConversationState::at(Phase::Done))
            .say(
                Speaker::Leo,
                "Awesome! Good luck everyone. Let's crush this presentation.",
            )
            .say(Speaker::Alex, "See you guys!")
            .say(Speaker::Bella, "Bye."),
        _ => Turn::new(ConversationState::at(Phase::Done)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ending_runs_three_beats_then_done() {
        let mut state = ConversationState::at(Phase::Ending);
        let mut spoken = Vec::new();
        for _ in 0..3 {
            let turn = ending(&state);
            spoken.extend(turn.responses);
            state = turn.new_state;
        }
        assert_eq!(state, ConversationState::at(Phase::Done));
        assert_eq!(spoken.len(), 5);
        assert_eq!(spoken.last().unwrap().text, "Bye.");
    }

    #[test]
    fn test_ending_past_script_finishes_silently() {
        let state = ConversationState {
            step: 7,
            ..ConversationState::at(Phase::Ending)
        };
        let turn = ending(&state);
        assert!(turn.responses.is_empty());
        assert!(turn.new_state.phase.is_terminal());
    }
}
