//! Chat Session Client
//!
//! This module turns user input into requests against the forwarding proxy
//! and agent replies into transcript entries. A session allows only one
//! outstanding request at a time; the transcript and loading flag are
//! published on a `watch` channel so that views can follow along and scroll
//! to the newest entry whenever either changes.

use crate::message::{Message, Transcript};
use crate::protocol::{
    BACKEND_ERROR_REPLY, CHAT_PATH, EMPTY_REPLY_FALLBACK, MESSAGE_PARAM, SESSION_ID_PARAM,
    TITLE_HINT,
};
use crate::session::SessionId;
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid proxy URL: {0}")]
    InvalidUrl(String),
    #[error("Request to proxy failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Proxy returned status {0}")]
    Status(u16),
}

/// Carries one user message to the agent and returns its raw reply text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &str, session_id: &SessionId) -> Result<String, TransportError>;
}

/// A `ChatTransport` that calls the forwarding proxy over HTTP.
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpChatTransport {
    /// Creates a transport for the proxy reachable at `proxy_base`
    /// (e.g. `http://127.0.0.1:3000`).
    pub fn new(proxy_base: &str) -> Result<Self, TransportError> {
        let endpoint = Url::parse(proxy_base)
            .and_then(|base| base.join(CHAT_PATH))
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, message: &str, session_id: &SessionId) -> Result<String, TransportError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[(MESSAGE_PARAM, message), (SESSION_ID_PARAM, session_id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// What a view needs to render the conversation.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub transcript: Transcript,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The input was empty after trimming.
    Empty,
    /// Another request is still in flight.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(IgnoreReason),
    /// The agent replied and its answer was appended.
    Answered,
    /// The exchange failed and the error reply was appended.
    Failed,
}

/// Clears the loading flag when the request finishes, however it finishes.
struct LoadingGuard<'a> {
    view: &'a watch::Sender<ViewState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.view.send_if_modified(|state| std::mem::replace(&mut state.loading, false));
    }
}

/// One conversation with the agent, keyed by a fixed session identifier.
pub struct ChatSession {
    session_id: SessionId,
    transport: Arc<dyn ChatTransport>,
    view: watch::Sender<ViewState>,
    title_hint: bool,
}

impl ChatSession {
    pub fn new(session_id: SessionId, transport: Arc<dyn ChatTransport>) -> Self {
        let (view, _) = watch::channel(ViewState::default());
        Self {
            session_id,
            transport,
            view,
            title_hint: false,
        }
    }

    /// Asks the agent to bold movie titles on every outbound message.
    pub fn with_title_hint(mut self, enabled: bool) -> Self {
        self.title_hint = enabled;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn is_loading(&self) -> bool {
        self.view.borrow().loading
    }

    /// A snapshot of the conversation so far.
    pub fn transcript(&self) -> Transcript {
        self.view.borrow().transcript.clone()
    }

    /// Subscribes to transcript and loading changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    /// Sends one user message and appends the agent's answer.
    ///
    /// The user's message is appended before the request is issued. Every
    /// accepted submission appends exactly one assistant message afterwards,
    /// either the reply or a fixed error text. A transport that panics leaves
    /// the transcript without that reply, but the loading flag is still cleared.
    #[instrument(name = "chat_submit", skip_all, fields(session_id = %self.session_id))]
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::Empty);
        }

        // Check-and-set under the channel's lock so concurrent submits cannot both win.
        let accepted = self.view.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.transcript.push(Message::user(text));
            state.loading = true;
            true
        });
        if !accepted {
            info!("Ignoring submission while a request is in flight");
            return SubmitOutcome::Ignored(IgnoreReason::Busy);
        }
        let _loading = LoadingGuard { view: &self.view };

        let outbound = if self.title_hint {
            format!("{text}{TITLE_HINT}")
        } else {
            text.to_string()
        };

        let (reply, outcome) = match self.transport.send(&outbound, &self.session_id).await {
            Ok(body) if body.is_empty() => {
                (EMPTY_REPLY_FALLBACK.to_string(), SubmitOutcome::Answered)
            }
            Ok(body) => (body, SubmitOutcome::Answered),
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                (BACKEND_ERROR_REPLY.to_string(), SubmitOutcome::Failed)
            }
        };

        self.view
            .send_modify(|state| state.transcript.push(Message::assistant(reply)));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;
    use tokio::sync::Notify;

    fn session_with(mock: MockChatTransport) -> ChatSession {
        ChatSession::new(SessionId::new("sess-1"), Arc::new(mock))
    }

    fn contents(session: &ChatSession) -> Vec<(MessageRole, String)> {
        session
            .transcript()
            .messages()
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_assistant() {
        let mut mock = MockChatTransport::new();
        mock.expect_send()
            .withf(|message, session_id| message == "sci-fi please" && session_id.as_str() == "sess-1")
            .times(1)
            .returning(|_, _| Ok("Try **Alien**\\nIt is great.".to_string()));
        let session = session_with(mock);

        let outcome = session.submit("  sci-fi please  ").await;

        assert_eq!(outcome, SubmitOutcome::Answered);
        assert_eq!(
            contents(&session),
            vec![
                (MessageRole::User, "sci-fi please".to_string()),
                (MessageRole::Assistant, "Try **Alien**\\nIt is great.".to_string()),
            ]
        );
        let transcript = session.transcript();
        let rendered = transcript.messages()[1].rendered_content();
        assert_eq!(rendered, "Try **Alien**\nIt is great.");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored_without_request() {
        let mut mock = MockChatTransport::new();
        mock.expect_send().times(0);
        let session = session_with(mock);

        assert_eq!(
            session.submit("").await,
            SubmitOutcome::Ignored(IgnoreReason::Empty)
        );
        assert_eq!(
            session.submit(" \t\n ").await,
            SubmitOutcome::Ignored(IgnoreReason::Empty)
        );
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_uses_fallback() {
        let mut mock = MockChatTransport::new();
        mock.expect_send().returning(|_, _| Ok(String::new()));
        let session = session_with(mock);

        assert_eq!(session.submit("hello").await, SubmitOutcome::Answered);
        assert_eq!(
            session.transcript().last_assistant().unwrap().content,
            EMPTY_REPLY_FALLBACK
        );
    }

    #[tokio::test]
    async fn test_failures_append_uniform_error_reply() {
        let mut mock = MockChatTransport::new();
        let mut call = 0;
        mock.expect_send().times(2).returning(move |_, _| {
            call += 1;
            if call == 1 {
                Err(TransportError::Status(503))
            } else {
                Err(TransportError::Status(400))
            }
        });
        let session = session_with(mock);

        assert_eq!(session.submit("first").await, SubmitOutcome::Failed);
        assert_eq!(session.submit("second").await, SubmitOutcome::Failed);

        let replies: Vec<String> = contents(&session)
            .into_iter()
            .filter(|(role, _)| *role == MessageRole::Assistant)
            .map(|(_, content)| content)
            .collect();
        assert_eq!(replies, vec![BACKEND_ERROR_REPLY, BACKEND_ERROR_REPLY]);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_title_hint_is_sent_but_not_recorded() {
        let mut mock = MockChatTransport::new();
        mock.expect_send()
            .withf(|message, _| message == format!("comedies{TITLE_HINT}"))
            .times(1)
            .returning(|_, _| Ok("**Airplane!**".to_string()));
        let session = session_with(mock).with_title_hint(true);

        session.submit("comedies").await;

        assert_eq!(session.transcript().messages()[0].content, "comedies");
    }

    struct GatedTransport {
        gate: Notify,
    }

    #[async_trait]
    impl ChatTransport for GatedTransport {
        async fn send(&self, message: &str, _: &SessionId) -> Result<String, TransportError> {
            self.gate.notified().await;
            Ok(format!("reply to {message}"))
        }
    }

    #[tokio::test]
    async fn test_second_submit_while_busy_is_ignored() {
        let transport = Arc::new(GatedTransport {
            gate: Notify::new(),
        });
        let session = Arc::new(ChatSession::new(SessionId::new("s"), transport.clone()));
        let mut view = session.subscribe();

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.submit("first").await }
        });
        view.wait_for(|state| state.loading).await.unwrap();

        assert_eq!(
            session.submit("second").await,
            SubmitOutcome::Ignored(IgnoreReason::Busy)
        );
        assert_eq!(session.transcript().len(), 1);

        transport.gate.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Answered);

        let state = view.wait_for(|state| !state.loading).await.unwrap().clone();
        let texts: Vec<&str> = state
            .transcript
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "reply to first"]);
    }

    struct PanickingTransport;

    #[async_trait]
    impl ChatTransport for PanickingTransport {
        async fn send(&self, _: &str, _: &SessionId) -> Result<String, TransportError> {
            panic!("transport exploded");
        }
    }

    #[tokio::test]
    async fn test_loading_cleared_when_request_panics() {
        let session = Arc::new(ChatSession::new(
            SessionId::new("s"),
            Arc::new(PanickingTransport),
        ));

        let handle = tokio::spawn({
            let session = session.clone();
            async move { session.submit("boom").await }
        });
        assert!(handle.await.is_err());

        assert!(!session.is_loading());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_http_transport_builds_chat_endpoint() {
        let transport = HttpChatTransport::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(
            transport.endpoint().as_str(),
            "http://127.0.0.1:3000/api/chat"
        );
        assert!(matches!(
            HttpChatTransport::new("not a url"),
            Err(TransportError::InvalidUrl(_))
        ));
    }
}
