//! Intent detection over the normalized user message
//!
//! Every detector is a pure function of the lower-cased, trimmed message and
//! is driven by an ordered rule table compiled once.

use super::state::{TaskName, Topic};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

fn cue(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("intent cue patterns are valid")
}

// ============================================================================
// Topic detection
// ============================================================================

/// Per topic: the cue that names it outright, and the looser cue that only
/// mentions it ("mental" alone is a mention, "mental health" a choice).
static TOPIC_RULES: LazyLock<Vec<(Regex, Regex, Topic)>> = LazyLock::new(|| {
    vec![
        (cue("stress|mental health"), cue("stress|mental"), Topic::StressMentalHealth),
        (cue("social media"), cue("social media"), Topic::SocialMedia),
        (cue("group|individual"), cue("group|individual"), Topic::GroupWork),
        (cue("online|in-person|in person"), cue("online|in-person"), Topic::OnlineLearning),
        (cue("procrastination"), cue("procrastination"), Topic::Procrastination),
    ]
});

static ASKING_TEAM: LazyLock<Regex> =
    LazyLock::new(|| cue("what.*(you|do you|guys|team|we|think|should)"));

static DEFERRING: LazyLock<Regex> = LazyLock::new(|| {
    cue("you.*(choose|decide|pick)|up to you|don't know|whatever|any|not sure|you guys")
});

/// Outcome of topic detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicIntent {
    /// Exactly one topic named, and not as a question to the team
    Chosen(Topic),
    /// No definite choice. The caller falls back to team deliberation.
    Undecided {
        /// Topics mentioned, in table order
        mentioned: Vec<Topic>,
        /// The message asks the teammates what they think
        asking_team: bool,
    },
}

impl TopicIntent {
    pub fn chosen(&self) -> Option<Topic> {
        match self {
            TopicIntent::Chosen(topic) => Some(*topic),
            TopicIntent::Undecided { .. } => None,
        }
    }
}

pub fn detect_topic(message: &str) -> TopicIntent {
    let named: Vec<Topic> = TOPIC_RULES
        .iter()
        .filter(|(re, _, _)| re.is_match(message))
        .map(|(_, _, topic)| *topic)
        .collect();
    let asking_team = ASKING_TEAM.is_match(message);

    // More than one topic, or a question back to the team, is never a choice.
    if let [topic] = named.as_slice() {
        if !asking_team {
            return TopicIntent::Chosen(*topic);
        }
    }

    TopicIntent::Undecided {
        mentioned: TOPIC_RULES
            .iter()
            .filter(|(_, re, _)| re.is_match(message))
            .map(|(_, _, topic)| *topic)
            .collect(),
        asking_team,
    }
}

/// "You guys pick", "not sure", "whatever"
pub fn defers_to_team(message: &str) -> bool {
    DEFERRING.is_match(message)
}

// ============================================================================
// Topic debate
// ============================================================================

static DEBATE_ASK_TEAM: LazyLock<Regex> = LazyLock::new(|| {
    cue("what.*(you|do you|guys|team|we|think|should)|you.*(decide|choose|pick)")
});
static DEBATE_INSIST: LazyLock<Regex> = LazyLock::new(|| {
    cue("yes|yeah|still|prefer|want|my choice|let's do|go with that|that one|i think")
});
static DEBATE_INSIST_VETO: LazyLock<Regex> = LazyLock::new(|| cue("procrastination|your"));
static DEBATE_CONCEDE: LazyLock<Regex> = LazyLock::new(|| {
    cue("ok|okay|alright|fine|sure|procrastination|your|change|sounds good")
});

/// How the user answers Alex's counter-offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebateStance {
    /// Hands the decision to the team
    AskTeam,
    /// Keeps their own topic
    Insist,
    /// Switches to Alex's topic
    Concede,
    Unclear,
}

pub fn detect_debate_stance(message: &str) -> DebateStance {
    if DEBATE_ASK_TEAM.is_match(message) {
        DebateStance::AskTeam
    } else if DEBATE_INSIST.is_match(message) && !DEBATE_INSIST_VETO.is_match(message) {
        DebateStance::Insist
    } else if DEBATE_CONCEDE.is_match(message) {
        DebateStance::Concede
    } else {
        DebateStance::Unclear
    }
}

// ============================================================================
// Greeting
// ============================================================================

static START_CUES: LazyLock<Regex> =
    LazyLock::new(|| cue("yes|yeah|ok|okay|sure|let's|start|project|begin"));

static SMALL_TALK_RULES: LazyLock<Vec<(Regex, SmallTalk)>> = LazyLock::new(|| {
    vec![
        (
            cue("good|great|fine|not bad|doing well|pretty good"),
            SmallTalk::Upbeat,
        ),
        (cue("tired|exhausted|sleepy|busy|stressed"), SmallTalk::Worn),
        (cue("you|how about you|what about you"), SmallTalk::AskedBack),
    ]
});

/// Mood of a small-talk reply during the greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
    Upbeat,
    Worn,
    AskedBack,
    Neutral,
}

pub fn wants_to_start(message: &str) -> bool {
    START_CUES.is_match(message)
}

pub fn detect_small_talk(message: &str) -> SmallTalk {
    SMALL_TALK_RULES
        .iter()
        .find(|(re, _)| re.is_match(message))
        .map_or(SmallTalk::Neutral, |(_, mood)| *mood)
}

// ============================================================================
// Task claims
// ============================================================================

// Anchored at a word start only, so "causes" claims Causes but "because" does not.
static TASK_RULES: LazyLock<Vec<(Regex, TaskName)>> = LazyLock::new(|| {
    vec![
        (cue(r"\bintro"), TaskName::Intro),
        (cue(r"\bcause"), TaskName::Causes),
        (cue(r"\beffect"), TaskName::Effects),
        (cue(r"\bsolution"), TaskName::Solutions),
        (cue(r"\bconclusion"), TaskName::Conclusion),
    ]
});

static MORE_CUES: LazyLock<Regex> = LazyLock::new(|| cue(r"\b(more|also|too|and|both)\b"));

static ACCEPTANCE: LazyLock<Regex> = LazyLock::new(|| {
    cue("^(yes|yeah|ok|okay|sure|fine|sounds good|yep|yup|alright|i'm good|good|no problem|i can do that)$")
});

/// Every task the message claims. Several at once are legal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskClaims {
    pub tasks: BTreeSet<TaskName>,
    /// "more", "also", "too", "and", "both"
    pub wants_more: bool,
}

impl TaskClaims {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task: TaskName) -> bool {
        self.tasks.contains(&task)
    }

    /// Claims exactly this task and nothing else
    pub fn is_only(&self, task: TaskName) -> bool {
        self.tasks.len() == 1 && self.contains(task)
    }
}

pub fn detect_tasks(message: &str) -> TaskClaims {
    TaskClaims {
        tasks: TASK_RULES
            .iter()
            .filter(|(re, _)| re.is_match(message))
            .map(|(_, task)| *task)
            .collect(),
        wants_more: MORE_CUES.is_match(message),
    }
}

/// Bare agreement to whatever was just offered
pub fn is_acceptance(message: &str) -> bool {
    ACCEPTANCE.is_match(message)
}

// ============================================================================
// Contributions
// ============================================================================

const ACKNOWLEDGEMENTS: &[&str] = &[
    "no",
    "nope",
    "nothing",
    "ok",
    "okay",
    "good",
    "sure",
    "fine",
    "yes",
    "yeah",
    "yep",
    "yup",
    "idk",
    "i don't know",
    "alright",
    "right",
    "cool",
    "nice",
    "that's good",
    "that's it",
];

const MIN_CONTRIBUTION_CHARS: usize = 3;

/// Whether a reply adds content rather than just acknowledging
pub fn is_substantive_contribution(message: &str) -> bool {
    message.chars().count() > MIN_CONTRIBUTION_CHARS
        && !ACKNOWLEDGEMENTS
            .iter()
            .any(|ack| ack.eq_ignore_ascii_case(message))
}
