use serde::{Deserialize, Serialize};

/// A request to be sent to the chat service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user message, exactly as it was typed.
    pub message: String,
}

impl ChatRequest {
    /// Creates a request carrying `message`.
    #[inline]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A successful answer from the chat service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatReply {
    /// The reply text. Callers should use it verbatim.
    pub reply: String,
}
