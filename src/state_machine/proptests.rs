//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::intent::{detect_tasks, detect_topic, TaskClaims, TopicIntent};
use super::negotiation::{self, Stage};
use super::selector::FixedSelector;
use super::state::*;
use super::transition::transition;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_phase() -> impl Strategy<Value = Phase> {
    proptest::sample::select(Phase::ALL.to_vec())
}

fn arb_topic() -> impl Strategy<Value = Topic> {
    proptest::sample::select(Topic::ALL.to_vec())
}

fn arb_task() -> impl Strategy<Value = TaskName> {
    proptest::sample::select(TaskName::ALL.to_vec())
}

fn arb_assignee() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Alex".to_string()),
        Just("Leo".to_string()),
        Just("Bella".to_string()),
        Just("Sam".to_string()),
    ]
}

fn arb_task_map() -> impl Strategy<Value = TaskMap> {
    proptest::collection::btree_map(arb_task(), arb_assignee(), 0..=5)
}

fn arb_claims() -> impl Strategy<Value = TaskClaims> {
    (proptest::collection::btree_set(arb_task(), 0..=5), any::<bool>())
        .prop_map(|(tasks, wants_more)| TaskClaims { tasks, wants_more })
}

fn arb_state() -> impl Strategy<Value = ConversationState> {
    (
        arb_phase(),
        0u32..8,
        proptest::option::of(arb_topic().prop_map(|t| t.name().to_string())),
        arb_task_map(),
        0u32..3,
    )
        .prop_map(|(phase, step, chosen_topic, tasks, proactive_count)| ConversationState {
            phase,
            step,
            chosen_topic,
            tasks,
            proactive_count,
            ..ConversationState::default()
        })
}

/// Realistic chatter mixed with arbitrary noise
fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("ok".to_string()),
        Just("let's start".to_string()),
        Just("what do you guys think?".to_string()),
        Just("i'll do the intro".to_string()),
        Just("solutions and conclusion".to_string()),
        Just("social media please".to_string()),
        "[a-zA-Z ,.?']{0,40}",
    ]
}

/// Two distinct topic keywords somewhere in a sentence
fn arb_multi_topic_message() -> impl Strategy<Value = String> {
    let keyword = proptest::sample::select(vec![
        "stress",
        "social media",
        "group work",
        "online learning",
        "procrastination",
    ]);
    (keyword.clone(), keyword, "[a-z ]{0,10}")
        .prop_filter("distinct topics", |(a, b, _)| a != b)
        .prop_map(|(a, b, filler)| format!("{a}{filler} or {b}"))
}

fn is_complete(tasks: &TaskMap) -> bool {
    tasks.len() == TaskName::ALL.len()
        && TaskName::ALL.iter().all(|task| tasks.contains_key(task))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: Done is absorbing
    #[test]
    fn prop_done_is_absorbing(
        state in arb_state(),
        message in arb_message(),
        name in "[A-Za-z]{0,8}",
    ) {
        let state = ConversationState { phase: Phase::Done, ..state };
        let turn = transition(&state, &message, &name, &FixedSelector(0));
        prop_assert!(turn.responses.is_empty());
        prop_assert_eq!(turn.new_state, state);
    }

    // Invariant 2: Several topics at once is never a definite choice
    #[test]
    fn prop_multi_topic_is_undecided(message in arb_multi_topic_message()) {
        let is_undecided = matches!(detect_topic(&message), TopicIntent::Undecided { .. });
        prop_assert!(is_undecided, "guessed a topic for {:?}", message);
    }

    // Invariant 3: Any resolved claim covers all five tasks
    #[test]
    fn prop_negotiation_covers_all_tasks(
        claims in arb_claims(),
        current in arb_task_map(),
        respond in any::<bool>(),
    ) {
        let stage = if respond { Stage::Respond } else { Stage::Claim };
        let settlements = [
            negotiation::negotiate(stage, &claims, &current, "Sam"),
            Some(negotiation::accept_open(&current, "Sam")),
            Some(negotiation::force_open(&current, "Sam")),
        ];
        for settlement in settlements.into_iter().flatten() {
            prop_assert!(is_complete(&settlement.tasks), "incomplete: {:?}", settlement.tasks);
            prop_assert!(!settlement.lines.is_empty());
        }
    }

    // Invariant 4: A claim leaves the claimed task with the user
    #[test]
    fn prop_single_claim_goes_to_user(task in arb_task()) {
        let claims = TaskClaims { tasks: [task].into(), wants_more: false };
        let settled = negotiation::negotiate(Stage::Claim, &claims, &TaskMap::new(), "Sam");
        prop_assert!(settled.is_some());
        let settled = settled.unwrap();
        prop_assert_eq!(settled.tasks[&task].as_str(), "Sam");
    }

    // Invariant 5: Task detection never invents claims for task-free chatter
    #[test]
    fn prop_no_task_words_no_claims(message in "[fghjkmpqwxyz ]{0,30}") {
        prop_assert!(detect_tasks(&message).is_empty());
    }

    // Invariant 6: Every transition yields a state that survives the wire
    #[test]
    fn prop_transition_output_round_trips(
        state in arb_state(),
        message in arb_message(),
        pick in 0usize..4,
    ) {
        let turn = transition(&state, &message, "Sam", &FixedSelector(pick));
        let wire = serde_json::to_value(&turn.new_state).unwrap();
        let restored = ConversationState::restore(Some(wire));
        prop_assert_eq!(restored, turn.new_state.clone());
        if state.phase.is_terminal() {
            return Ok(());
        }
        prop_assert!(turn.new_state.proactive_count <= 1);
        if turn.new_state.phase == Phase::TaskSummary && state.phase != Phase::TaskSummary {
            prop_assert!(is_complete(&turn.new_state.tasks));
        }
    }

    // Invariant 7: Silence never stalls twice in a row
    #[test]
    fn prop_silence_always_progresses(state in arb_state()) {
        prop_assume!(!state.phase.is_terminal());
        let selector = FixedSelector(0);
        let first = transition(&state, "", "Sam", &selector);
        let second = transition(&first.new_state, "", "Sam", &selector);
        prop_assert!(
            first.new_state.proactive_count == 0 || second.new_state.proactive_count == 0,
            "nudged twice from {:?}",
            state
        );
    }
}
