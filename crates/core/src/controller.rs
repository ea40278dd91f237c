//! Per-session controller.
//!
//! `MovieGenius` owns everything one user interacts with: the conversation
//! with the agent and the wheel of candidate movies. Views hold a controller
//! and call into it; there is no global state.

use crate::chat::{ChatSession, ChatTransport, SubmitOutcome, ViewState};
use crate::session::{SessionStore, resolve_session_id};
use crate::titles::extract_titles;
use crate::wheel::{Spin, Wheel, WheelCandidates, WheelError};
use std::sync::Arc;
use tokio::sync::watch;

pub struct MovieGenius {
    chat: ChatSession,
    wheel: Wheel,
}

impl MovieGenius {
    /// Builds a controller whose session id comes from `store`, or is
    /// generated when the store has none.
    pub fn new(store: &dyn SessionStore, transport: Arc<dyn ChatTransport>, wheel: Wheel) -> Self {
        let session_id = resolve_session_id(store);
        Self {
            chat: ChatSession::new(session_id, transport),
            wheel,
        }
    }

    /// Toggles the bold-title instruction appended to outbound messages.
    pub fn with_title_hint(mut self, enabled: bool) -> Self {
        self.chat = self.chat.with_title_hint(enabled);
        self
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.chat.subscribe()
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        self.chat.submit(text).await
    }

    /// Titles bolded in the most recent agent reply.
    pub fn suggested_titles(&self) -> Vec<String> {
        self.chat
            .transcript()
            .last_assistant()
            .map(|m| extract_titles(&m.content))
            .unwrap_or_default()
    }

    pub async fn add_candidate(&self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() {
            return false;
        }
        self.wheel.add_candidate(item).await
    }

    pub async fn remove_candidate(&self, index: usize) -> Option<String> {
        self.wheel.remove_candidate(index).await
    }

    pub async fn candidates(&self) -> WheelCandidates {
        self.wheel.candidates().await
    }

    pub async fn spin(&self) -> Result<Spin, WheelError> {
        self.wheel.spin().await
    }
}
