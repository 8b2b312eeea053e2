use std::error::Error;

use crate::error::ErrorKind;
use crate::message::{ChatReply, ChatRequest};

/// The error type for a chat service.
pub trait ChatServiceError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns the diagnostic detail reported by the remote side, if any.
    ///
    /// This is meant for logs only. Callers must behave correctly without
    /// it.
    fn detail(&self) -> Option<&str> {
        None
    }
}

/// A type that represents a remote chat service.
///
/// Once the service is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the service should be prepared for being dropped anytime.
pub trait ChatService: Send + Sync {
    /// The error type that may be returned by the service.
    type Error: ChatServiceError;

    /// Sends a message and waits for the reply.
    ///
    /// The returned future must not borrow from `self` or `req`, so that
    /// it can be moved into a separate task while the caller goes on
    /// handling other events.
    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static;
}
