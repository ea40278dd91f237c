//! MovieGenius terminal client.
//!
//! Chats with the movie agent through the forwarding proxy and keeps a wheel
//! of candidate movies to pick from when the conversation has produced a few.

mod commands;
mod render;

use anyhow::Context;
use clap::Parser;
use commands::{Command, HELP};
use movie_genius_core::{
    HttpChatTransport, MemoryStore, MovieGenius, SessionStore, SubmitOutcome, Wheel,
    chat::IgnoreReason, session::SESSION_ID_KEY, wheel::ThreadRandom,
};
use std::{sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Chat with the MovieGenius agent from your terminal")]
struct Args {
    /// Base URL of the MovieGenius proxy.
    #[arg(long, env = "MOVIE_GENIUS_PROXY_URL", default_value = "http://127.0.0.1:3000")]
    proxy_url: String,

    /// Resume an existing agent session instead of starting a new one.
    #[arg(long, env = "MOVIE_GENIUS_SESSION_ID")]
    session_id: Option<String>,

    /// Do not ask the agent to bold the titles it suggests.
    #[arg(long)]
    no_title_hint: bool,

    /// How long the wheel spins before announcing a winner.
    #[arg(long, default_value_t = 4.0)]
    spin_seconds: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let spin_duration = Duration::try_from_secs_f64(args.spin_seconds)
        .context("--spin-seconds must be a non-negative number")?;

    let mut store = MemoryStore::new();
    if let Some(session_id) = &args.session_id {
        store.set(SESSION_ID_KEY, session_id);
    }

    let transport =
        HttpChatTransport::new(&args.proxy_url).context("Failed to create proxy client")?;
    let wheel = Wheel::new(Arc::new(ThreadRandom)).with_duration(spin_duration);
    let app = Arc::new(
        MovieGenius::new(&store, Arc::new(transport), wheel).with_title_hint(!args.no_title_hint),
    );
    info!(session_id = %app.chat().session_id(), proxy = %args.proxy_url, "MovieGenius client started");

    println!("MovieGenius - ask for genres, actors, or moods. /help for commands.");
    tokio::spawn(render::follow(app.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let Some(command) = commands::parse(&line) else {
            continue;
        };
        match command {
            Command::Chat(text) => {
                let app = app.clone();
                tokio::spawn(async move {
                    if app.submit(&text).await == SubmitOutcome::Ignored(IgnoreReason::Busy) {
                        println!("Still waiting for the last answer, try again in a moment.");
                    }
                });
            }
            Command::Titles => {
                let titles = app.suggested_titles();
                if titles.is_empty() {
                    println!("No titles in the latest reply.");
                }
                for title in titles {
                    println!("  - {title}");
                }
            }
            Command::Add(title) => {
                if app.add_candidate(&title).await {
                    println!("Added '{title}' to the wheel.");
                } else {
                    println!("'{title}' is already on the wheel.");
                }
            }
            Command::AddAll => {
                let mut added = 0;
                for title in app.suggested_titles() {
                    if app.add_candidate(&title).await {
                        added += 1;
                    }
                }
                println!("Added {added} movie(s) to the wheel.");
            }
            Command::Remove(position) => match app.remove_candidate(position - 1).await {
                Some(title) => println!("Removed '{title}' from the wheel."),
                None => println!("There is no movie number {position} on the wheel."),
            },
            Command::Wheel => println!("{}", render::format_wheel(&app.candidates().await)),
            Command::Spin => match app.spin().await {
                Ok(spin) => {
                    println!("Spinning...");
                    tokio::spawn(async move {
                        match spin.winner().await {
                            Ok(winner) => println!("\nThe wheel picked: {winner}!\n"),
                            Err(e) => println!("{e}"),
                        }
                    });
                }
                Err(e) => println!("{e}."),
            },
            Command::Help => println!("{HELP}"),
            Command::Invalid(reason) => println!("{reason}"),
            Command::Quit => break,
        }
    }

    Ok(())
}
