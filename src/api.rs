//! HTTP API
//!
//! `POST /orchestrate` drives the conversation; the rest are conveniences
//! for the browser client.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::llm::LlmService;
use crate::orchestrator::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Backs `/chat`; absent without credentials
    pub llm: Option<Arc<dyn LlmService>>,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, llm: Option<Arc<dyn LlmService>>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            llm,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }
}
