//! Picking the presentation topic
//!
//! Every teammate has a favourite. Naming one of those settles the topic at
//! once; naming a topic nobody wanted makes Alex push back with a debate.

use super::intent::{self, DebateStance, TopicIntent};
use super::state::{ChosenBy, ConversationState, Phase, Speaker, Topic, Turn};
use super::transition::TurnContext;

/// Used when a restored state reaches confirmation without a topic
const FALLBACK_TOPIC: Topic = Topic::Procrastination;

pub fn topic_list(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    if let Some(topic) = intent::detect_topic(ctx.message).chosen() {
        return select_topic(topic);
    }

    let next = ConversationState::at(Phase::TopicPreference);
    match state.step {
        0 => Turn::new(next)
            .say(Speaker::Alex, "The professor gave us five options.")
            .say(
                Speaker::Alex,
                "Stress and Mental Health, Social Media and Study Habits, Group Work vs Individual Work, Online vs In-person Learning, and Procrastination.",
            ),
        _ => Turn::new(next),
    }
}

pub fn topic_preference(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    if let Some(topic) = intent::detect_topic(ctx.message).chosen() {
        return select_topic(topic);
    }

    match state.step {
        0 => Turn::new(state.next_step()).say(
            Speaker::Alex,
            "I kind of want to do Procrastination. Super relatable, right?",
        ),
        1 => Turn::new(state.next_step()).say(
            Speaker::Leo,
            "I was thinking Stress and Mental Health. Important topic.",
        ),
        2 => Turn::new(ConversationState::at(Phase::TopicChoose))
            .say(Speaker::Bella, "Online Learning could be interesting."),
        _ => Turn::new(ConversationState::at(Phase::TopicChoose)),
    }
}

pub fn topic_choose(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    let mentioned = match intent::detect_topic(ctx.message) {
        TopicIntent::Chosen(topic) => return select_topic(topic),
        TopicIntent::Undecided { mentioned, .. } => mentioned,
    };

    if mentioned.len() > 1 {
        let pick = team_pick(&mentioned);
        return Turn::new(state.with_topic(pick.name(), ChosenBy::Team))
            .say(Speaker::Leo, "Both sound good actually.")
            .say(
                Speaker::Alex,
                format!("Yeah, let's just pick one. How about {}?", pick.name()),
            )
            .say(Speaker::Bella, "Works for me.");
    }

    if intent::defers_to_team(ctx.message) {
        return Turn::new(state.with_topic(Topic::Procrastination.name(), ChosenBy::Alex))
            .say(Speaker::Alex, "Let's go with Procrastination then!")
            .say(Speaker::Leo, "Works for me.");
    }

    if state.step == 0 {
        return Turn::new(ConversationState {
            step: 1,
            ..ConversationState::at(Phase::TopicChoose)
        })
        .say(
            Speaker::Leo,
            format!(
                "{}, what do you think? Which one interests you?",
                ctx.user_name
            ),
        );
    }

    Turn::new(ConversationState {
        step: 2,
        ..ConversationState::at(Phase::TopicChoose)
    })
    .say(Speaker::Alex, "So which topic are you leaning towards?")
}

/// The team's pick when the user names several topics
fn team_pick(mentioned: &[Topic]) -> Topic {
    [
        Topic::Procrastination,
        Topic::OnlineLearning,
        Topic::StressMentalHealth,
    ]
    .into_iter()
    .find(|t| mentioned.contains(t))
    .unwrap_or(Topic::OnlineLearning)
}

/// React to the user naming exactly one topic
pub fn select_topic(topic: Topic) -> Turn {
    let chosen = |by| ConversationState::new().with_topic(topic.name(), by);

    match topic.favoured_by() {
        Some(Speaker::Alex) => Turn::new(chosen(ChosenBy::user_with(Speaker::Alex)))
            .say(Speaker::Alex, "Yes! That's what I wanted!")
            .say(Speaker::Leo, "Sounds good to me.")
            .say(Speaker::Bella, "Okay."),
        Some(Speaker::Leo) => Turn::new(chosen(ChosenBy::user_with(Speaker::Leo)))
            .say(Speaker::Leo, "Nice, I was hoping we'd pick that one.")
            .say(Speaker::Alex, "Fine by me.")
            .say(Speaker::Bella, "Sure."),
        Some(Speaker::Bella) => Turn::new(chosen(ChosenBy::user_with(Speaker::Bella)))
            .say(Speaker::Bella, "Oh, that's what I wanted.")
            .say(Speaker::Alex, "Yeah, Online Learning could be interesting.")
            .say(Speaker::Leo, "Works for me."),
        None => Turn::new(ConversationState {
            user_choice: Some(topic.key().to_string()),
            user_choice_name: Some(topic.name().to_string()),
            ..ConversationState::at(Phase::TopicDebate)
        })
        .say(
            Speaker::Alex,
            "Hmm, I was hoping we'd do Procrastination. Everyone can relate to it, right?",
        ),
    }
}

pub fn topic_debate(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    let proposal = debated_topic(state);

    match intent::detect_debate_stance(ctx.message) {
        DebateStance::AskTeam => Turn::new(state.with_topic(proposal.clone(), ChosenBy::Team))
            .say(
                Speaker::Leo,
                format!("Hmm, I think {proposal} could work well."),
            )
            .say(Speaker::Alex, "Yeah, let's just go with that."),
        DebateStance::Insist => Turn::new(state.with_topic(proposal.clone(), ChosenBy::User))
            .say(
                Speaker::Leo,
                format!("Alright, let's go with {proposal} then."),
            )
            .say(Speaker::Alex, "Okay, fine by me."),
        DebateStance::Concede => {
            Turn::new(state.with_topic(Topic::Procrastination.name(), ChosenBy::Alex))
                .say(Speaker::Alex, "Sweet! Procrastination it is!")
                .say(Speaker::Leo, "Sounds good.")
        }
        DebateStance::Unclear => Turn::new(ConversationState {
            step: 1,
            user_choice: state.user_choice.clone(),
            user_choice_name: Some(proposal.clone()),
            ..ConversationState::at(Phase::TopicDebate)
        })
        .say(
            Speaker::Leo,
            format!(
                "What do you think? Should we stick with {proposal} or go with Procrastination?"
            ),
        ),
    }
}

/// Name of the topic the user proposed, recovered from whatever survived
fn debated_topic(state: &ConversationState) -> String {
    state
        .user_choice_name
        .clone()
        .or_else(|| {
            state
                .user_choice
                .as_deref()
                .and_then(Topic::from_key)
                .map(|t| t.name().to_string())
        })
        .unwrap_or_else(|| FALLBACK_TOPIC.name().to_string())
}

pub fn topic_confirm(state: &ConversationState) -> Turn {
    let topic = state
        .chosen_topic
        .clone()
        .unwrap_or_else(|| FALLBACK_TOPIC.name().to_string());

    Turn::new(ConversationState {
        chosen_topic: Some(topic.clone()),
        ..state.advance_to(Phase::StructureIntro)
    })
    .say(
        Speaker::Leo,
        format!("Alright, {topic} it is. Let's figure out the structure."),
    )
}
