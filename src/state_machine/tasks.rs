//! Splitting the presentation between the four of us
//!
//! The teammates call dibs one at a time during `task_claim`. The user can
//! jump in at any point; otherwise Leo offers the leftover task and the
//! answer is negotiated in `task_respond`.

use super::intent;
use super::negotiation::{self, Settlement, Stage, MAX_REPROMPTS};
use super::state::{join_labels, ConversationState, Phase, Speaker, TaskMap, TaskName, Turn};
use super::transition::TurnContext;

fn settle(state: &ConversationState, settlement: Settlement) -> Turn {
    let user_task = settlement.user_task_label();
    let next = ConversationState {
        tasks: settlement.tasks,
        user_task: (!user_task.is_empty()).then_some(user_task),
        ..state.advance_to(Phase::TaskSummary)
    };
    Turn::new(next).with_lines(settlement.lines)
}

fn with_task(state: &ConversationState, task: TaskName, speaker: Speaker) -> TaskMap {
    let mut tasks = state.tasks.clone();
    tasks.insert(task, speaker.display_name().to_string());
    tasks
}

pub fn task_claim(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    let claims = intent::detect_tasks(ctx.message);
    if let Some(settlement) = negotiation::negotiate(Stage::Claim, &claims, &state.tasks, ctx.user_name)
    {
        return settle(state, settlement);
    }

    let stepped = |tasks: TaskMap| ConversationState {
        tasks,
        ..state.next_step()
    };

    match state.step {
        0 => Turn::new(stepped(with_task(state, TaskName::Intro, Speaker::Alex)))
            .say(Speaker::Alex, "I'll do Intro!"),
        1 => Turn::new(stepped(with_task(state, TaskName::Effects, Speaker::Leo)))
            .say(Speaker::Leo, "I can take Effects."),
        2 => Turn::new(stepped(with_task(state, TaskName::Conclusion, Speaker::Bella)))
            .say(Speaker::Bella, "Conclusion for me."),
        3 => Turn::new(state.next_step()).say(
            Speaker::Alex,
            "Bella, Conclusion is kinda short. Maybe you can take Solutions too?",
        ),
        4 => Turn::new(ConversationState {
            tasks: with_task(state, TaskName::Solutions, Speaker::Bella),
            ..state.advance_to(Phase::TaskAsk)
        })
        .say(Speaker::Bella, "Sure, I can do both."),
        _ => Turn::new(state.advance_to(Phase::TaskAsk)),
    }
}

/// Label for whatever nobody has claimed, Causes in the usual flow
fn open_label(state: &ConversationState) -> String {
    let open = negotiation::open_tasks(&negotiation::baseline(Stage::Respond, &state.tasks));
    if open.is_empty() {
        TaskName::Causes.label().to_string()
    } else {
        join_labels(&open)
    }
}

pub fn task_ask(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    Turn::new(state.advance_to(Phase::TaskRespond)).say(
        Speaker::Leo,
        format!(
            "So {}, that leaves {} for you. You okay with that, or want to swap?",
            ctx.user_name,
            open_label(state)
        ),
    )
}

pub fn task_respond(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    let claims = intent::detect_tasks(ctx.message);
    if let Some(settlement) =
        negotiation::negotiate(Stage::Respond, &claims, &state.tasks, ctx.user_name)
    {
        return settle(state, settlement);
    }

    if intent::is_acceptance(ctx.message) {
        return settle(state, negotiation::accept_open(&state.tasks, ctx.user_name));
    }

    if state.step >= MAX_REPROMPTS {
        return settle(state, negotiation::force_open(&state.tasks, ctx.user_name));
    }

    Turn::new(state.next_step()).say(
        Speaker::Alex,
        format!(
            "So {} works for you? Or you wanna swap with someone?",
            open_label(state)
        ),
    )
}

/// Who does what, grouped by person in task order.
///
/// Gaps left by a restored state fall back to the usual split with the user
/// on Causes.
pub fn task_summary(state: &ConversationState, ctx: &TurnContext<'_>) -> Turn {
    let mut tasks = negotiation::default_roster();
    tasks.insert(TaskName::Causes, ctx.user_name.to_string());
    tasks.extend(state.tasks.iter().map(|(task, who)| (*task, who.clone())));

    let mut groups: Vec<(&str, Vec<TaskName>)> = Vec::new();
    for task in TaskName::ALL {
        let Some(who) = tasks.get(&task) else {
            continue;
        };
        match groups.iter_mut().find(|(person, _)| *person == who.as_str()) {
            Some((_, owned)) => owned.push(task),
            None => groups.push((who.as_str(), vec![task])),
        }
    }

    let parts: Vec<String> = groups
        .iter()
        .map(|(person, owned)| format!("{person} does {}", join_labels(owned)))
        .collect();
    let line = format!("So: {}. Everyone good?", parts.join(", "));

    let next = ConversationState {
        tasks,
        ..state.advance_to(Phase::Ending)
    };
    Turn::new(next).say(Speaker::Leo, line)
}
