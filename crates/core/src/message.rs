//! Conversation Messages
//!
//! This module defines the transcript entries exchanged between the user and
//! the movie agent, along with the append-only `Transcript` that holds them.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use uuid::Uuid;

/// The literal two-character sequence the agent uses to encode a line break.
const ESCAPED_NEWLINE: &str = "\\n";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single, immutable transcript entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
        }
    }

    /// Returns the content ready for display, with escaped newlines turned
    /// into real line breaks. The stored content is left untouched.
    pub fn rendered_content(&self) -> Cow<'_, str> {
        unescape_newlines(&self.content)
    }
}

/// Replaces every literal `\n` (backslash, `n`) with a line break.
pub fn unescape_newlines(text: &str) -> Cow<'_, str> {
    if text.contains(ESCAPED_NEWLINE) {
        Cow::Owned(text.replace(ESCAPED_NEWLINE, "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// The ordered conversation for the current controller lifetime.
///
/// Messages can only be appended; insertion order is conversation order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message written by the agent, if any.
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }
}
