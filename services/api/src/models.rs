//! API Models
//!
//! Request and response shapes of the forwarding proxy, annotated for the
//! OpenAPI document generated with `utoipa`.

use movie_genius_core::protocol::{MESSAGE_PARAM, SESSION_ID_PARAM};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// Query parameters of `GET /api/chat`.
///
/// Both fields are required; they are optional here so that a missing value
/// produces the proxy's own error body. The handler builds this from the raw
/// pairs with [`ChatQuery::from_pairs`].
#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    /// The user's message for the agent.
    #[param(example = "Something like Blade Runner")]
    pub message: Option<String>,
    /// Identifier of the conversation held by the agent backend.
    #[param(example = "V1StGXR8_Z5jdHi6B-myT")]
    pub session_id: Option<String>,
}

impl ChatQuery {
    /// Builds the query from decoded `key=value` pairs in request order.
    ///
    /// A repeated parameter keeps its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                MESSAGE_PARAM => &mut query.message,
                SESSION_ID_PARAM => &mut query.session_id,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    /// Detail extracted from the agent backend's error body, when relaying one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
