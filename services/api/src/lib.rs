//! MovieGenius Proxy Library Crate
//!
//! This library contains the forwarding proxy that sits between the chat
//! client and the movie agent backend: configuration, the backend client,
//! the HTTP handler, and routing. The `api` binary is a thin wrapper around it.

pub mod backend;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
