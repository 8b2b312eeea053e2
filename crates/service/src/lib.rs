//! An abstraction layer for remote chat backends.
//!
//! This crate establishes the contract between a conversation and the
//! service that answers it: one message goes out, one reply (or one error)
//! comes back. Keeping it separate lets the conversation logic run against
//! a real HTTP backend or a scripted in-process one without changes.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod message;
mod service;

pub use error::*;
pub use message::*;
pub use service::*;
