//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use classflow_core::ports::{DatabaseService, TextGenerationService};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    /// Generation adapter for guides, quizzes, and recommendations.
    pub llm: Arc<dyn TextGenerationService>,
    /// Separate (cheaper) adapter for the high-volume feedback fan-out.
    pub feedback_llm: Arc<dyn TextGenerationService>,
}
