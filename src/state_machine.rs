//! Scripted conversation state machine
//!
//! Every turn is a pure function from (state, message) to (lines, next
//! state). The caller owns the state between turns.

mod closing;
pub mod content;
mod greeting;
pub mod intent;
pub mod negotiation;
pub mod proactive;
pub mod selector;
pub mod state;
mod structure;
mod tasks;
mod topic;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use greeting::opening_lines;
pub use selector::{LineSelector, RandomSelector};
pub use state::{ConversationState, Line, Phase, Speaker, Turn};
pub use transition::{transition, DEFAULT_USER_NAME};
