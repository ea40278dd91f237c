//! MovieGenius Core
//!
//! Client-side logic for the MovieGenius movie recommender: the chat session
//! that talks to the forwarding proxy, the wheel used to pick between
//! suggested movies, and the controller tying both to one user session.

pub mod chat;
pub mod controller;
pub mod message;
pub mod protocol;
pub mod session;
pub mod titles;
pub mod wheel;

pub use chat::{ChatSession, ChatTransport, HttpChatTransport, SubmitOutcome, ViewState};
pub use controller::MovieGenius;
pub use message::{Message, MessageRole, Transcript};
pub use session::{CookieJar, MemoryStore, SessionId, SessionStore};
pub use wheel::{Spin, Wheel, WheelCandidates, WheelError};
