//! A lightweight actor framework.
//!
//! An actor owns a piece of state and handles messages one at a time, in
//! the order they arrive. Nothing else touches the state, so handlers
//! never need locks, and callers interact with it only through [`Actor`]
//! handles.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::ActorDeadError;
pub use handle::{Actor, WeakActor};
pub use mailbox::{Message, Request};
