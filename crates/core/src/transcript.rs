//! Transcript-related types.

use std::fmt::{self, Display};
use std::slice;
use std::sync::Arc;

/// The text shown in place of a reply when the chat service could not be
/// reached or answered with an error.
pub const ERROR_REPLY: &str = "⚠️ Error contacting server.";

/// Who a message comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person typing.
    User,
    /// The chat service.
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// An entry in the transcript.
///
/// Messages are immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Creates a message typed by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a message from the assistant.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Returns who this message comes from.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content, exactly as it was typed or received.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// An ordered, append-only list of messages.
///
/// Cloning is cheap. Clones share storage until one of them grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Arc<Vec<Message>>,
}

impl Transcript {
    /// Returns the messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Iterates over the messages in chronological order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }

    #[inline]
    pub(crate) fn push(&mut self, message: Message) {
        Arc::make_mut(&mut self.messages).push(message);
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = slice::Iter<'a, Message>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
