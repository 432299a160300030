//! Conversation state types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Phases
// ============================================================================

/// Stage of the scripted conversation.
///
/// Each variant has exactly one handler; `Done` is terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Greeting,
    TopicList,
    TopicPreference,
    TopicChoose,
    TopicDebate,
    TopicConfirm,
    StructureIntro,
    StructureCauses,
    StructureEffects,
    StructureSolutions,
    StructureConfirm,
    TaskClaim,
    TaskAsk,
    TaskRespond,
    TaskSummary,
    Ending,
    Done,
}

impl Phase {
    pub const ALL: [Phase; 17] = [
        Phase::Greeting,
        Phase::TopicList,
        Phase::TopicPreference,
        Phase::TopicChoose,
        Phase::TopicDebate,
        Phase::TopicConfirm,
        Phase::StructureIntro,
        Phase::StructureCauses,
        Phase::StructureEffects,
        Phase::StructureSolutions,
        Phase::StructureConfirm,
        Phase::TaskClaim,
        Phase::TaskAsk,
        Phase::TaskRespond,
        Phase::TaskSummary,
        Phase::Ending,
        Phase::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Greeting => "greeting",
            Phase::TopicList => "topic_list",
            Phase::TopicPreference => "topic_preference",
            Phase::TopicChoose => "topic_choose",
            Phase::TopicDebate => "topic_debate",
            Phase::TopicConfirm => "topic_confirm",
            Phase::StructureIntro => "structure_intro",
            Phase::StructureCauses => "structure_causes",
            Phase::StructureEffects => "structure_effects",
            Phase::StructureSolutions => "structure_solutions",
            Phase::StructureConfirm => "structure_confirm",
            Phase::TaskClaim => "task_claim",
            Phase::TaskAsk => "task_ask",
            Phase::TaskRespond => "task_respond",
            Phase::TaskSummary => "task_summary",
            Phase::Ending => "ending",
            Phase::Done => "done",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done)
    }

    /// Phases whose lines are offered to the polish service
    pub fn is_polishable(self) -> bool {
        matches!(
            self,
            Phase::StructureCauses
                | Phase::StructureEffects
                | Phase::StructureSolutions
                | Phase::TaskClaim
                | Phase::TaskRespond
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised phase name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase: {0}")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

// Unknown or missing phase names restore to the initial phase instead of
// failing the whole state.
impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            None => Phase::default(),
            Some(name) => name.parse().unwrap_or_else(|e: UnknownPhase| {
                tracing::warn!(error = %e, "Restoring unknown phase as greeting");
                Phase::default()
            }),
        })
    }
}

// ============================================================================
// Participants
// ============================================================================

/// One of the three synthetic teammates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// Energetic, wants Procrastination, claims Intro
    Alex,
    /// Calm moderator, wants Stress and Mental Health, claims Effects
    Leo,
    /// Quiet, wants Online Learning, absorbs leftover tasks
    Bella,
}

impl Speaker {
    pub fn display_name(self) -> &'static str {
        match self {
            Speaker::Alex => "Alex",
            Speaker::Leo => "Leo",
            Speaker::Bella => "Bella",
        }
    }

    /// Map an assignee name back to a participant, if it is one
    pub fn from_display_name(name: &str) -> Option<Self> {
        [Speaker::Alex, Speaker::Leo, Speaker::Bella]
            .into_iter()
            .find(|s| s.display_name() == name)
    }
}

/// A single spoken line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub speaker: Speaker,
    pub text: String,
}

impl Line {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

// ============================================================================
// Topics
// ============================================================================

/// The five presentation topics offered by the professor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    #[serde(rename = "stress")]
    StressMentalHealth,
    #[serde(rename = "social")]
    SocialMedia,
    #[serde(rename = "group")]
    GroupWork,
    #[serde(rename = "online")]
    OnlineLearning,
    Procrastination,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::StressMentalHealth,
        Topic::SocialMedia,
        Topic::GroupWork,
        Topic::OnlineLearning,
        Topic::Procrastination,
    ];

    /// Short key used in `userChoice`
    pub fn key(self) -> &'static str {
        match self {
            Topic::StressMentalHealth => "stress",
            Topic::SocialMedia => "social",
            Topic::GroupWork => "group",
            Topic::OnlineLearning => "online",
            Topic::Procrastination => "procrastination",
        }
    }

    /// Canonical name used in `chosenTopic` and in spoken lines
    pub fn name(self) -> &'static str {
        match self {
            Topic::StressMentalHealth => "Stress and Mental Health",
            Topic::SocialMedia => "Social Media and Study Habits",
            Topic::GroupWork => "Group Work vs Individual Work",
            Topic::OnlineLearning => "Online Learning",
            Topic::Procrastination => "Procrastination",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Topic::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Topic::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The participant who already hoped for this topic
    pub fn favoured_by(self) -> Option<Speaker> {
        match self {
            Topic::Procrastination => Some(Speaker::Alex),
            Topic::StressMentalHealth => Some(Speaker::Leo),
            Topic::OnlineLearning => Some(Speaker::Bella),
            Topic::SocialMedia | Topic::GroupWork => None,
        }
    }
}

/// Who settled the final topic. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChosenBy {
    Team,
    Alex,
    User,
    UserAlex,
    UserLeo,
    UserBella,
}

impl ChosenBy {
    pub fn user_with(speaker: Speaker) -> Self {
        match speaker {
            Speaker::Alex => ChosenBy::UserAlex,
            Speaker::Leo => ChosenBy::UserLeo,
            Speaker::Bella => ChosenBy::UserBella,
        }
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Presentation sections to divide, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskName {
    Intro,
    Causes,
    Effects,
    Solutions,
    Conclusion,
}

impl TaskName {
    pub const ALL: [TaskName; 5] = [
        TaskName::Intro,
        TaskName::Causes,
        TaskName::Effects,
        TaskName::Solutions,
        TaskName::Conclusion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskName::Intro => "Intro",
            TaskName::Causes => "Causes",
            TaskName::Effects => "Effects",
            TaskName::Solutions => "Solutions",
            TaskName::Conclusion => "Conclusion",
        }
    }
}

/// Task assignments. Keyed by `TaskName` so iteration follows presentation order.
pub type TaskMap = BTreeMap<TaskName, String>;

/// Join task labels the way they are spoken: "Conclusion and Solutions"
pub fn join_labels(tasks: &[TaskName]) -> String {
    tasks
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(" and ")
}

// ============================================================================
// Conversation State
// ============================================================================

/// Full conversation state, round-tripped by the caller every turn
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    #[serde(default, deserialize_with = "lenient")]
    pub phase: Phase,
    /// Phase-local progress counter, reset on every phase change
    #[serde(default, deserialize_with = "lenient")]
    pub step: u32,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub chosen_topic: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub chosen_by: Option<ChosenBy>,
    #[serde(
        default,
        deserialize_with = "lenient_tasks",
        skip_serializing_if = "TaskMap::is_empty"
    )]
    pub tasks: TaskMap,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_task: Option<String>,
    /// Consecutive silence turns since the last real message
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "is_zero")]
    pub proactive_count: u32,
    /// Topic key the user proposed before Alex pushed back
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_choice: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_choice_name: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read one field, falling back to its default when the value has the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring malformed state field");
        T::default()
    }))
}

/// Keep the recognisable task entries and drop the rest
fn lenient_tasks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TaskMap, D::Error> {
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(TaskMap::new());
    };

    let mut tasks = TaskMap::new();
    for (key, assignee) in entries {
        let task = serde_json::from_value::<TaskName>(Value::String(key.clone()));
        match (task, assignee) {
            (Ok(task), Value::String(name)) if !name.trim().is_empty() => {
                tasks.insert(task, name);
            }
            _ => tracing::warn!(task = %key, "Ignoring unrecognised task entry"),
        }
    }
    Ok(tasks)
}

impl ConversationState {
    /// Fresh session state
    pub fn new() -> Self {
        Self::default()
    }

    /// State at the start of `phase`, with nothing carried over
    pub fn at(phase: Phase) -> Self {
        Self {
            phase,
            ..Self::default()
        }
    }

    /// Restore a caller-supplied state, defaulting instead of failing.
    ///
    /// Only a non-object starts a fresh session; a bad field falls back to
    /// that field's default and the rest of the state is kept.
    pub fn restore(raw: Option<Value>) -> Self {
        match raw {
            None | Some(Value::Null) => Self::new(),
            Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Malformed conversation state, starting fresh");
                Self::new()
            }),
            Some(other) => {
                tracing::warn!(kind = %json_kind(&other), "Conversation state is not an object, starting fresh");
                Self::new()
            }
        }
    }

    /// Same state, one step further along the current phase
    pub fn next_step(&self) -> Self {
        Self {
            step: self.step.saturating_add(1),
            ..self.clone()
        }
    }

    /// Move to `phase` at step 0, carrying the agreed topic and tasks.
    ///
    /// Debate-only fields and display continuity are dropped.
    pub fn advance_to(&self, phase: Phase) -> Self {
        Self {
            phase,
            step: 0,
            chosen_topic: self.chosen_topic.clone(),
            chosen_by: self.chosen_by,
            tasks: self.tasks.clone(),
            ..Self::default()
        }
    }

    /// Settle the topic and move on to `topic_confirm`
    pub fn with_topic(&self, topic: impl Into<String>, by: ChosenBy) -> Self {
        Self {
            phase: Phase::TopicConfirm,
            step: 0,
            chosen_topic: Some(topic.into()),
            chosen_by: Some(by),
            ..Self::default()
        }
    }

    /// Topic for spoken lines, with a placeholder when none is agreed yet
    pub fn topic_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.chosen_topic.as_deref().unwrap_or(placeholder)
    }
}

// ============================================================================
// Turn output
// ============================================================================

/// Lines spoken this turn plus the state for the next one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub responses: Vec<Line>,
    pub new_state: ConversationState,
}

impl Turn {
    pub fn new(new_state: ConversationState) -> Self {
        Self {
            responses: vec![],
            new_state,
        }
    }

    pub fn say(mut self, speaker: Speaker, text: impl Into<String>) -> Self {
        self.responses.push(Line::new(speaker, text));
        self
    }

    pub fn with_lines(mut self, lines: impl IntoIterator<Item = Line>) -> Self {
        self.responses.extend(lines);
        self
    }

    /// Combined length of all spoken text
    pub fn text_len(&self) -> usize {
        self.responses.iter().map(|l| l.text.chars().count()).sum()
    }
}
