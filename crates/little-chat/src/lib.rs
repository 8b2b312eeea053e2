//! A terminal chat client for a remote chat service.
//!
//! The crate includes a CLI tool for chatting in the terminal. It can also
//! be used as a library to drive a conversation from your own host app,
//! with [`render`] helping to print the transcript.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod render;
mod session;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`little_chat_core`] crate.
pub mod core {
    pub use little_chat_core::*;
}
