//! Task negotiation
//!
//! Resolves the user's task claims against the teammates' own claims. The
//! rules apply in priority order:
//!
//! 1. Conclusion and Solutions together (or one of them plus a "more/also"
//!    cue while the user already holds the other) both go to the user, and
//!    Bella takes Causes.
//! 2. A single claim takes the task from its holder, who falls back to the
//!    secondary task(s) in the displacement table. Several claims at once
//!    resolve by a stage-specific precedence.
//! 3. With nothing recognisable the open task is offered again, and after
//!    [`MAX_REPROMPTS`] re-prompts it is assigned to the user outright.
//!
//! Every settlement covers all five tasks with exactly one assignee each.

use super::intent::TaskClaims;
use super::state::{join_labels, Line, Speaker, TaskMap, TaskName};

/// Re-prompts in `task_respond` before the open task is force-assigned
pub const MAX_REPROMPTS: u32 = 2;

/// Takes Causes when the user claims both Conclusion and Solutions
const SHORTED_FALLBACK: Speaker = Speaker::Bella;

/// Where the claim was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Pre-emptively, while the teammates are still calling dibs
    Claim,
    /// In answer to being offered the leftover task
    Respond,
}

/// A complete assignment and what the teammates say about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub tasks: TaskMap,
    pub lines: Vec<Line>,
    /// Tasks the user ends up having asked for, for display
    pub user_tasks: Vec<TaskName>,
}

impl Settlement {
    pub fn user_task_label(&self) -> String {
        join_labels(&self.user_tasks)
    }
}

/// Who claims what when the user stays out of it. Causes is left open.
pub fn default_roster() -> TaskMap {
    TaskMap::from([
        (TaskName::Intro, Speaker::Alex.display_name().to_string()),
        (TaskName::Effects, Speaker::Leo.display_name().to_string()),
        (TaskName::Solutions, Speaker::Bella.display_name().to_string()),
        (TaskName::Conclusion, Speaker::Bella.display_name().to_string()),
    ])
}

fn default_holder(task: TaskName) -> Option<Speaker> {
    match task {
        TaskName::Intro => Some(Speaker::Alex),
        TaskName::Effects => Some(Speaker::Leo),
        TaskName::Solutions | TaskName::Conclusion => Some(Speaker::Bella),
        TaskName::Causes => None,
    }
}

/// What a displaced holder takes instead
fn displacement(task: TaskName) -> &'static [TaskName] {
    match task {
        TaskName::Intro | TaskName::Effects | TaskName::Conclusion => &[TaskName::Causes],
        TaskName::Solutions => &[TaskName::Conclusion, TaskName::Causes],
        TaskName::Causes => &[],
    }
}

/// Which claim wins when several single tasks are named at once.
///
/// When offered the leftover task, Causes only counts when named alone.
fn precedence(stage: Stage) -> [TaskName; 5] {
    match stage {
        Stage::Claim => [
            TaskName::Conclusion,
            TaskName::Solutions,
            TaskName::Causes,
            TaskName::Effects,
            TaskName::Intro,
        ],
        Stage::Respond => [
            TaskName::Intro,
            TaskName::Effects,
            TaskName::Solutions,
            TaskName::Conclusion,
            TaskName::Causes,
        ],
    }
}

fn claim_lines(stage: Stage, task: TaskName) -> &'static [(Speaker, &'static str)] {
    match (stage, task) {
        (Stage::Claim, TaskName::Intro) => &[
            (Speaker::Alex, "What? You want Intro? That's my thing!"),
            (Speaker::Alex, "Fine... I'll do Causes then."),
        ],
        (Stage::Claim, TaskName::Causes) => &[(Speaker::Leo, "Got it!")],
        (Stage::Claim, TaskName::Effects) => &[(
            Speaker::Leo,
            "Effects? I was gonna do that... Okay, I'll take Causes.",
        )],
        (Stage::Claim, TaskName::Solutions) => &[(
            Speaker::Bella,
            "You want Solutions? Okay, I'll do Conclusion and Causes.",
        )],
        (Stage::Claim, TaskName::Conclusion) => &[(
            Speaker::Bella,
            "Oh, I wanted Conclusion... I'll take Causes then.",
        )],
        (Stage::Respond, TaskName::Intro) => &[
            (Speaker::Alex, "Wait, you want Intro? That's mine..."),
            (Speaker::Alex, "Ugh fine, I'll do Causes then."),
        ],
        (Stage::Respond, TaskName::Causes) => &[(Speaker::Alex, "Cool!")],
        (Stage::Respond, TaskName::Effects) => &[
            (Speaker::Leo, "Effects? I was gonna do that one."),
            (Speaker::Leo, "Okay, I'll take Causes instead."),
        ],
        (Stage::Respond, TaskName::Solutions) => &[(
            Speaker::Bella,
            "You want Solutions? Okay, I'll just do Conclusion and Causes.",
        )],
        (Stage::Respond, TaskName::Conclusion) => &[
            (Speaker::Bella, "Oh, I wanted Conclusion..."),
            (Speaker::Bella, "Fine, I'll do Causes instead."),
        ],
    }
}

fn pair_lines(stage: Stage) -> &'static [(Speaker, &'static str)] {
    match stage {
        Stage::Claim => &[
            (
                Speaker::Bella,
                "Oh wow, you want both? Okay, I'll do Causes then.",
            ),
            (Speaker::Alex, "Nice, thanks for taking on more!"),
        ],
        Stage::Respond => &[
            (Speaker::Bella, "Okay, I'll take Causes then."),
            (Speaker::Alex, "Nice, thanks for stepping up!"),
        ],
    }
}

/// Assignments the claim is resolved against.
///
/// A pre-emptive claim is measured against the full default roster even if
/// the teammates have not all spoken yet.
pub fn baseline(stage: Stage, current: &TaskMap) -> TaskMap {
    match stage {
        Stage::Claim => default_roster(),
        Stage::Respond => {
            let mut tasks = default_roster();
            tasks.extend(current.iter().map(|(task, who)| (*task, who.clone())));
            tasks
        }
    }
}

/// Tasks nobody holds yet, in presentation order
pub fn open_tasks(tasks: &TaskMap) -> Vec<TaskName> {
    TaskName::ALL
        .into_iter()
        .filter(|task| !tasks.contains_key(task))
        .collect()
}

fn fill_open(tasks: &mut TaskMap, user: &str) {
    for task in open_tasks(tasks) {
        tasks.insert(task, user.to_string());
    }
}

/// Resolve recognised claims. `None` when the message claims nothing.
pub fn negotiate(
    stage: Stage,
    claims: &TaskClaims,
    current: &TaskMap,
    user: &str,
) -> Option<Settlement> {
    let base = baseline(stage, current);
    let held_by_user = |task| base.get(&task).is_some_and(|who| who == user);

    let pair = (claims.contains(TaskName::Solutions) && claims.contains(TaskName::Conclusion))
        || (claims.wants_more
            && ((claims.contains(TaskName::Solutions) && held_by_user(TaskName::Conclusion))
                || (claims.contains(TaskName::Conclusion) && held_by_user(TaskName::Solutions))));

    if pair {
        return Some(claim_pair(stage, base, user));
    }

    let task = precedence(stage)
        .into_iter()
        .find(|t| claims.contains(*t))?;
    Some(claim_single(stage, task, base, user))
}

fn claim_pair(stage: Stage, mut tasks: TaskMap, user: &str) -> Settlement {
    tasks.insert(TaskName::Solutions, user.to_string());
    tasks.insert(TaskName::Conclusion, user.to_string());
    tasks.insert(
        TaskName::Causes,
        SHORTED_FALLBACK.display_name().to_string(),
    );
    fill_open(&mut tasks, user);

    Settlement {
        tasks,
        lines: pair_lines(stage)
            .iter()
            .map(|(speaker, text)| Line::new(*speaker, *text))
            .collect(),
        user_tasks: vec![TaskName::Conclusion, TaskName::Solutions],
    }
}

fn claim_single(stage: Stage, task: TaskName, mut tasks: TaskMap, user: &str) -> Settlement {
    let displaced = tasks
        .get(&task)
        .and_then(|who| Speaker::from_display_name(who));

    tasks.insert(task, user.to_string());
    if let Some(holder) = displaced {
        for fallback in displacement(task) {
            tasks.insert(*fallback, holder.display_name().to_string());
        }
    }
    fill_open(&mut tasks, user);

    // The complaint comes from whoever actually lost the task.
    let usual = default_holder(task);
    let lines = claim_lines(stage, task)
        .iter()
        .map(|(speaker, text)| {
            let speaker = match displaced {
                Some(holder) if Some(*speaker) == usual => holder,
                _ => *speaker,
            };
            Line::new(speaker, *text)
        })
        .collect();

    Settlement {
        tasks,
        lines,
        user_tasks: vec![task],
    }
}

/// The user agrees to take whatever is still open
pub fn accept_open(current: &TaskMap, user: &str) -> Settlement {
    settle_open(current, user, Line::new(Speaker::Alex, "Cool!"))
}

/// Out of re-prompts: the open task goes to the user without asking again
pub fn force_open(current: &TaskMap, user: &str) -> Settlement {
    let base = baseline(Stage::Respond, current);
    let open = open_tasks(&base);
    let line = if open.is_empty() {
        Line::new(Speaker::Leo, "Alright, let's keep it like that then!")
    } else {
        Line::new(
            Speaker::Leo,
            format!("Alright, you take {} then!", join_labels(&open)),
        )
    };
    settle_open(current, user, line)
}

fn settle_open(current: &TaskMap, user: &str, line: Line) -> Settlement {
    let mut tasks = baseline(Stage::Respond, current);
    let user_tasks = open_tasks(&tasks);
    fill_open(&mut tasks, user);
    Settlement {
        tasks,
        lines: vec![line],
        user_tasks,
    }
}
