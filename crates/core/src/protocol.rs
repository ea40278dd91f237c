//! Wire-level constants shared by the chat client and the forwarding proxy.

/// Path served by the proxy and expected on the agent backend.
pub const CHAT_PATH: &str = "/api/chat";

/// Query parameter carrying the user's text.
pub const MESSAGE_PARAM: &str = "message";

/// Query parameter carrying the session identifier.
pub const SESSION_ID_PARAM: &str = "session_id";

/// Shown when the agent answers with an empty body.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I couldn't process that.";

/// Shown for every failed exchange, whatever the cause.
pub const BACKEND_ERROR_REPLY: &str = "Error connecting to backend.";

/// Appended to outbound messages when the title hint is enabled, so that
/// suggested titles come back in bold and can be offered to the wheel.
pub const TITLE_HINT: &str = " If you suggest movies, please put the movie title in **bold** text and provide a short description or image after it.";
