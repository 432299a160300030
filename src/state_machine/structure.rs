//! Agreeing on the presentation structure
//!
//! The three body sections (causes, effects, solutions) share one runner: a
//! few scripted talking points, a question to the user, then one last turn
//! that classifies the user's reply before moving on.

use super::content::{self, Section};
use super::intent;
use super::state::{ConversationState, Phase, Speaker, Turn};
use super::transition::TurnContext;

/// Topic placeholder inside spoken lines before anything is agreed
const UNNAMED_TOPIC: &str = "this issue";

pub fn structure_intro(state: &ConversationState) -> Turn {
    let next = state.advance_to(Phase::StructureCauses);
    match state.step {
        0 => Turn::new(state.next_step())
            .say(Speaker::Alex, "I think we should have three main points."),
        1 => Turn::new(state.next_step()).say(
            Speaker::Leo,
            "Yeah. How about Causes, Effects, and Solutions?",
        ),
        2 => Turn::new(next).say(Speaker::Bella, "Sounds good."),
        _ => Turn::new(next),
    }
}

/// A scripted line inside a section, given the topic name and the user name
type LineFn = fn(&str, &str) -> String;

struct SectionScript {
    section: Section,
    /// Scripted lines, one per step, ending with the question to the user
    lines: &'static [(Speaker, LineFn)],
    /// Said instead of the next scripted line when the user chimes in early
    early_affirmation: [(Speaker, &'static str); 2],
    /// Said once when the user's answer to the final question adds something
    closing_affirmation: (Speaker, &'static str),
    next: Phase,
}

impl SectionScript {
    /// Step at which the user's answer to the final question is classified
    fn answer_step(&self) -> u32 {
        u32::try_from(self.lines.len()).unwrap_or(u32::MAX)
    }
}

fn point(topic: &str, section: Section, index: usize, fallback: &'static str) -> String {
    content::talking_point(topic, section, index, fallback).to_string()
}

const CAUSES: SectionScript = SectionScript {
    section: Section::Causes,
    lines: &[
        (Speaker::Leo, |topic, _| {
            format!(
                "Let's start with Causes. Why does {} happen?",
                topic.to_lowercase()
            )
        }),
        (Speaker::Alex, |topic, _| {
            format!("I'd say {}.", point(topic, Section::Causes, 0, "various factors"))
        }),
        (Speaker::Leo, |topic, _| {
            format!("Also {}.", point(topic, Section::Causes, 1, "other factors"))
        }),
        (Speaker::Alex, |_, user| {
            format!("{user}, any other causes you can think of?")
        }),
    ],
    early_affirmation: [
        (Speaker::Leo, "Yeah, that's a good one."),
        (Speaker::Alex, "Definitely should include that."),
    ],
    closing_affirmation: (Speaker::Leo, "Good point! Let's add that."),
    next: Phase::StructureEffects,
};

const EFFECTS: SectionScript = SectionScript {
    section: Section::Effects,
    lines: &[
        (Speaker::Leo, |topic, _| {
            format!(
                "Now Effects. What impact does {} have on students?",
                topic.to_lowercase()
            )
        }),
        (Speaker::Bella, |topic, _| {
            format!(
                "{}.",
                content::sentence_case(&point(topic, Section::Effects, 0, "negative impacts"))
            )
        }),
        (Speaker::Alex, |topic, _| {
            format!("And {}.", point(topic, Section::Effects, 1, "other issues"))
        }),
        (Speaker::Leo, |_, user| format!("Anything to add, {user}?")),
    ],
    early_affirmation: [
        (Speaker::Alex, "Yeah, that's true."),
        (Speaker::Leo, "Good point, we should mention that."),
    ],
    closing_affirmation: (Speaker::Alex, "True, that's a big one."),
    next: Phase::StructureSolutions,
};

const SOLUTIONS: SectionScript = SectionScript {
    section: Section::Solutions,
    lines: &[
        (Speaker::Leo, |topic, _| {
            format!(
                "Last one: Solutions. How can students deal with {}?",
                topic.to_lowercase()
            )
        }),
        (Speaker::Alex, |topic, _| {
            format!(
                "{}.",
                content::sentence_case(&point(topic, Section::Solutions, 0, "various strategies"))
            )
        }),
        (Speaker::Bella, |topic, _| {
            format!(
                "{}.",
                content::sentence_case(&point(topic, Section::Solutions, 1, "other methods"))
            )
        }),
        (Speaker::Leo, |topic, _| {
            format!(
                "{}.",
                content::sentence_case(&point(topic, Section::Solutions, 2, "more tips"))
            )
        }),
        (Speaker::Alex, |_, user| format!("{user}, any tips to add?")),
    ],
    early_affirmation: [
        (Speaker::Leo, "Nice one!"),
        (Speaker::Alex, "Yeah, that could really help."),
    ],
    closing_affirmation: (Speaker::Leo, "Great idea!"),
    next: Phase::StructureConfirm,
};

pub fn structure_causes(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    run_section(&CAUSES, state, ctx)
}

pub fn structure_effects(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    run_section(&EFFECTS, state, ctx)
}

pub fn structure_solutions(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    run_section(&SOLUTIONS, state, ctx)
}

fn run_section(script: &SectionScript, state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    let topic = state.topic_or(UNNAMED_TOPIC);
    let contributed = intent::is_substantive_contribution(ctx.message);
    let answer_step = script.answer_step();
    let step = state.step;

    // An early idea replaces the next scripted point; step 0 is the opener.
    if contributed && step >= 1 && step < answer_step {
        let [(first, first_text), (second, second_text)] = script.early_affirmation;
        return Turn::new(state.next_step())
            .say(first, first_text)
            .say(second, second_text);
    }

    let Ok(index) = usize::try_from(step) else {
        return Turn::new(state.advance_to(script.next));
    };
    if let Some((speaker, line)) = script.lines.get(index) {
        return Turn::new(state.next_step()).say(*speaker, line(topic, ctx.user_name));
    }

    let turn = Turn::new(state.advance_to(script.next));
    if step == answer_step && contributed {
        let (speaker, text) = script.closing_affirmation;
        tracing::debug!(section = ?script.section, "User contributed to section");
        return turn.say(speaker, text);
    }
    turn
}

pub fn structure_confirm(state: &ConversationState) -> Turn {
    Turn::new(state.advance_to(Phase::TaskClaim))
        .say(
            Speaker::Leo,
            "Okay, structure is done: Causes, Effects, Solutions.",
        )
        .say(Speaker::Alex, "Let's divide up the work.")
}
