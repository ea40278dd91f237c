//! Session Identity
//!
//! A session identifier correlates one client's requests with the conversation
//! state the agent backend keeps on its side. The client only ever reads a
//! persisted identifier; when none exists it generates one for its own
//! lifetime and leaves persistence to the backend.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Key under which the identifier is persisted (the `session_id` cookie in a browser).
pub const SESSION_ID_KEY: &str = "session_id";

const ID_ALPHABET: &[u8] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";
const ID_LENGTH: usize = 21;

/// An opaque session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh URL-safe identifier.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pluggable key-value persistence capability.
///
/// Browser cookies are one implementation; a server-side session store or a
/// plain in-memory map are others.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Reads the persisted identifier, or generates one when none is stored.
///
/// A generated identifier is deliberately not written back to `store`.
pub fn resolve_session_id(store: &dyn SessionStore) -> SessionId {
    match store.get(SESSION_ID_KEY).filter(|v| !v.is_empty()) {
        Some(existing) => {
            debug!(session_id = %existing, "Reusing persisted session id");
            SessionId(existing)
        }
        None => {
            let id = SessionId::generate();
            debug!(session_id = %id, "No persisted session id, generated a new one");
            id
        }
    }
}

/// A process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// A store backed by a cookie string such as `a=1; session_id=abc`.
///
/// Pairs keep their original order; `set` replaces an existing pair in place
/// or appends a new one.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    pairs: Vec<(String, String)>,
}

impl CookieJar {
    pub fn parse(header: &str) -> Self {
        let pairs = header
            .split(';')
            .filter_map(|part| {
                let (name, value) = part.trim_start().split_once('=')?;
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { pairs }
    }

    /// Renders the jar back into a `Cookie` header value.
    pub fn to_header(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl SessionStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(name, _)| name == key) {
            Some(pair) => pair.1 = value.to_string(),
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }
}
