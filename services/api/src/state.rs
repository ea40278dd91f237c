//! Shared Application State
//!
//! The proxy keeps no per-request state; `AppState` only carries the client
//! used to reach the agent backend.

use crate::backend::AgentBackend;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn AgentBackend>,
}
