//! Axum Handlers for the Forwarding Proxy
//!
//! The chat handler validates the client's query, forwards it to the agent
//! backend, and maps whatever comes back (or fails to) onto a structured
//! response. It never lets an error escape as a panic or an empty response.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::{
    models::{ChatQuery, ErrorResponse},
    state::AppState,
};

pub const MISSING_PARAMETERS: &str = "Missing required parameters: message or session_id.";
pub const BACKEND_UNAVAILABLE: &str = "Could not connect to the Python Agent backend service.";

/// Fields of a backend error body that may carry a human-readable detail, by priority.
const DETAIL_FIELDS: [&str; 3] = ["response", "error", "detail"];

pub enum ApiError {
    /// The client omitted `message` or `session_id`.
    MissingParameters,
    /// The backend answered with a non-success status.
    Backend { status: StatusCode, details: Value },
    /// The backend could not be reached or its answer could not be read.
    Unavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingParameters => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: MISSING_PARAMETERS.to_string(),
                    details: None,
                }),
            )
                .into_response(),
            ApiError::Backend { status, details } => {
                // Only the status code survives the client; its canonical phrase
                // stands in for whatever reason text the backend sent.
                let reason = status.canonical_reason().unwrap_or_default();
                (
                    status,
                    Json(ErrorResponse {
                        error: format!("Agent backend failed: {}", reason),
                        details: Some(details),
                    }),
                )
                    .into_response()
            }
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: BACKEND_UNAVAILABLE.to_string(),
                    details: None,
                }),
            )
                .into_response(),
        }
    }
}

/// Best-effort extraction of an error detail from a backend body.
///
/// Returns the first non-empty detail field of a JSON object body, or an
/// empty string when there is none or the body is not JSON.
pub fn extract_error_details(body: &[u8]) -> Value {
    let empty = || Value::String(String::new());
    let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
        return empty();
    };
    DETAIL_FIELDS
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|value| is_present(value))
        .cloned()
        .unwrap_or_else(empty)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Forward a chat message to the agent backend.
#[utoipa::path(
    get,
    path = "/api/chat",
    params(ChatQuery),
    responses(
        (status = 200, description = "The agent's JSON response, relayed unchanged"),
        (status = 400, description = "Missing message or session_id", body = ErrorResponse),
        (status = 503, description = "Agent backend unreachable", body = ErrorResponse),
        (status = "default", description = "Agent backend error, with the backend's status", body = ErrorResponse)
    )
)]
#[instrument(name = "chat_proxy", skip_all, fields(session_id))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let query = match pairs {
        Ok(Query(pairs)) => ChatQuery::from_pairs(pairs),
        Err(rejection) => {
            info!(error = %rejection, "Rejecting chat request with an unreadable query");
            return Err(ApiError::MissingParameters);
        }
    };
    let message = query.message.filter(|m| !m.is_empty());
    let session_id = query.session_id.filter(|s| !s.is_empty());
    let (Some(message), Some(session_id)) = (message, session_id) else {
        info!("Rejecting chat request with missing parameters");
        return Err(ApiError::MissingParameters);
    };
    tracing::Span::current().record("session_id", session_id.as_str());

    info!("Forwarding chat request to agent backend");
    let reply = state
        .backend
        .chat(&message, &session_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Network or communication error");
            ApiError::Unavailable
        })?;

    if !reply.status.is_success() {
        error!(status = %reply.status, "Agent backend returned an error");
        return Err(ApiError::Backend {
            status: reply.status,
            details: extract_error_details(&reply.body),
        });
    }

    let data = serde_json::from_slice::<Value>(&reply.body).map_err(|e| {
        error!(error = %e, "Agent backend returned a body that is not JSON");
        ApiError::Unavailable
    })?;
    Ok(Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{BackendError, BackendReply, MockAgentBackend},
        router::create_router,
    };
    use axum::{
        body::{Body, Bytes, to_bytes},
        http::Request,
    };
    use serde_json::json;
    use tower::ServiceExt;

    fn app(backend: MockAgentBackend) -> axum::Router {
        create_router(Arc::new(AppState {
            backend: Arc::new(backend),
        }))
    }

    fn reply(status: StatusCode, body: &'static str) -> BackendReply {
        BackendReply {
            status,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_session_id_is_rejected_without_backend_call() {
        let mut backend = MockAgentBackend::new();
        backend.expect_chat().times(0);

        let (status, body) = get(app(backend), "/api/chat?message=hello").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": MISSING_PARAMETERS}));
    }

    #[tokio::test]
    async fn test_missing_or_empty_message_is_rejected() {
        for uri in ["/api/chat?session_id=abc", "/api/chat?message=&session_id=abc", "/api/chat"] {
            let mut backend = MockAgentBackend::new();
            backend.expect_chat().times(0);

            let (status, body) = get(app(backend), uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({"error": MISSING_PARAMETERS}));
        }
    }

    #[tokio::test]
    async fn test_repeated_parameters_forward_first_value() {
        let mut backend = MockAgentBackend::new();
        backend
            .expect_chat()
            .withf(|message, session_id| message == "a" && session_id == "s")
            .times(1)
            .returning(|_, _| Ok(reply(StatusCode::OK, r#"{"response":"ok"}"#)));

        let (status, body) = get(app(backend), "/api/chat?message=a&message=b&session_id=s").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "ok"}));
    }

    #[tokio::test]
    async fn test_empty_first_value_is_missing() {
        let mut backend = MockAgentBackend::new();
        backend.expect_chat().times(0);

        let (status, body) = get(app(backend), "/api/chat?message=&message=b&session_id=s").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": MISSING_PARAMETERS}));
    }

    #[tokio::test]
    async fn test_success_relays_backend_json() {
        let mut backend = MockAgentBackend::new();
        backend
            .expect_chat()
            .withf(|message, session_id| message == "space movies?" && session_id == "abc")
            .times(1)
            .returning(|_, _| Ok(reply(StatusCode::OK, r#""Try **Alien**\\nClassic.""#)));

        let (status, body) = get(app(backend), "/api/chat?message=space%20movies%3F&session_id=abc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("Try **Alien**\\nClassic."));
    }

    #[tokio::test]
    async fn test_success_relays_objects_unchanged() {
        let mut backend = MockAgentBackend::new();
        backend
            .expect_chat()
            .returning(|_, _| Ok(reply(StatusCode::OK, r#"{"response":"hi","success":true}"#)));

        let (status, body) = get(app(backend), "/api/chat?message=hi&session_id=abc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "hi", "success": true}));
    }

    #[tokio::test]
    async fn test_backend_error_status_and_details_propagate() {
        let mut backend = MockAgentBackend::new();
        backend
            .expect_chat()
            .returning(|_, _| Ok(reply(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#)));

        let (status, body) = get(app(backend), "/api/chat?message=hi&session_id=abc").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Agent backend failed: Internal Server Error", "details": "boom"})
        );
    }

    #[tokio::test]
    async fn test_backend_error_with_unparseable_body_has_empty_details() {
        let mut backend = MockAgentBackend::new();
        backend
            .expect_chat()
            .returning(|_, _| Ok(reply(StatusCode::BAD_GATEWAY, "<html>oops</html>")));

        let (status, body) = get(app(backend), "/api/chat?message=hi&session_id=abc").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["details"], json!(""));
        assert_eq!(body["error"], json!("Agent backend failed: Bad Gateway"));
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_503() {
        let mut backend = MockAgentBackend::new();
        backend
            .expect_chat()
            .returning(|_, _| Err(BackendError::Transport("connection refused".to_string())));

        let (status, body) = get(app(backend), "/api/chat?message=hi&session_id=abc").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"error": BACKEND_UNAVAILABLE}));
    }

    #[tokio::test]
    async fn test_non_json_success_body_maps_to_503() {
        let mut backend = MockAgentBackend::new();
        backend
            .expect_chat()
            .returning(|_, _| Ok(reply(StatusCode::OK, "plain text")));

        let (status, _) = get(app(backend), "/api/chat?message=hi&session_id=abc").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_extract_error_details_priority() {
        assert_eq!(
            extract_error_details(br#"{"response":"r","error":"e","detail":"d"}"#),
            json!("r")
        );
        assert_eq!(
            extract_error_details(br#"{"response":"","error":"e"}"#),
            json!("e")
        );
        assert_eq!(
            extract_error_details(br#"{"detail":[{"loc":["query","message"]}]}"#),
            json!([{"loc": ["query", "message"]}])
        );
        assert_eq!(extract_error_details(br#"{"other":1}"#), json!(""));
        assert_eq!(extract_error_details(br#"["error"]"#), json!(""));
        assert_eq!(extract_error_details(b""), json!(""));
    }
}
