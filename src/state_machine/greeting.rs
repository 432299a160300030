//! Opening small talk, before the project comes up

use super::intent::{self, SmallTalk};
use super::selector::choose;
use super::state::{ConversationState, Line, Phase, Speaker, Turn};
use super::transition::TurnContext;

/// Lines the teammates open the session with, before the user says anything
pub fn opening_lines(user_name: &str) -> Vec<Line> {
    vec![
        Line::new(Speaker::Alex, format!("Hey {user_name}! Good to see you.")),
        Line::new(Speaker::Leo, "Hey! How's everyone doing?"),
        Line::new(Speaker::Bella, "Hi."),
    ]
}

const UPBEAT: &[(Speaker, &str)] = &[
    (Speaker::Alex, "Same here, honestly."),
    (Speaker::Leo, "Good to hear."),
    (Speaker::Alex, "Nice nice."),
];

const WORN: &[(Speaker, &str)] = &[
    (Speaker::Alex, "Ugh, same. This semester is rough."),
    (Speaker::Leo, "Yeah, I feel that."),
];

const ASKED_BACK: &[(Speaker, &str)] = &[
    (Speaker::Alex, "I'm doing okay. A bit tired but surviving."),
    (
        Speaker::Leo,
        "Pretty good, just trying to keep up with everything.",
    ),
];

const NEUTRAL: &[(Speaker, &str)] = &[
    (Speaker::Alex, "Yeah."),
    (Speaker::Leo, "Mm."),
    (Speaker::Bella, "Mm-hmm."),
];

pub fn greeting(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    if intent::wants_to_start(ctx.message) {
        return Turn::new(ConversationState::at(Phase::TopicList)).say(
            Speaker::Alex,
            "Alright! So we need to pick a topic for our group presentation.",
        );
    }

    let pool = match intent::detect_small_talk(ctx.message) {
        SmallTalk::Upbeat => UPBEAT,
        SmallTalk::Worn => WORN,
        SmallTalk::AskedBack => ASKED_BACK,
        SmallTalk::Neutral => NEUTRAL,
    };
    let (speaker, text) = *choose(ctx.selector, pool);

    Turn::new(state.next_step()).say(speaker, text)
}
