//! Terminal rendering of the conversation.
//!
//! The renderer follows the session's view channel and prints each new agent
//! message as it lands, which keeps the newest entry at the bottom of the
//! terminal the way the web page scrolls to it.

use movie_genius_core::{Message, MessageRole, ViewState, WheelCandidates};
use tokio::sync::watch;

pub fn format_message(message: &Message) -> String {
    match message.role {
        MessageRole::User => format!("you > {}", message.rendered_content()),
        MessageRole::Assistant => format!("\nMovieGenius > {}\n", message.rendered_content()),
    }
}

pub fn format_wheel(candidates: &WheelCandidates) -> String {
    if candidates.is_empty() {
        return "The wheel is empty. Add movies with /add or /add-all.".to_string();
    }
    candidates
        .items()
        .iter()
        .enumerate()
        .map(|(i, title)| format!("  {}. {}", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints agent messages and the thinking indicator until the session ends.
pub async fn follow(mut view: watch::Receiver<ViewState>) {
    let mut printed = 0;
    let mut was_loading = false;
    loop {
        {
            let state = view.borrow_and_update();
            let messages = state.transcript.messages();
            for message in messages.iter().skip(printed) {
                // The user already sees what they typed.
                if message.role == MessageRole::Assistant {
                    println!("{}", format_message(message));
                }
            }
            printed = messages.len();

            if state.loading && !was_loading {
                println!("MovieGenius is thinking...");
            }
            was_loading = state.loading;
        }
        if view.changed().await.is_err() {
            break;
        }
    }
}
