//! Core logic of a chat session: the conversation state machine, the
//! transcript it maintains, and the glue to a chat service.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod chat_client;
mod conversation;
pub mod transcript;

pub use chat_client::{ChatClient, ChatResult};
pub use conversation::{
    Conversation, ConversationBuilder, ConversationSnapshot, SendOutcome,
};
pub use little_chat_actor::ActorDeadError;
pub use transcript::{ERROR_REPLY, Message, Role, Transcript};
