use std::error::Error;
use std::fmt::{self, Display};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;

use little_chat_service::{
    ChatRequest, ChatService, ChatServiceError, ErrorKind,
};
use tracing::Instrument;

/// The reply text, or whatever went wrong on the way to it.
pub type ChatResult = Result<String, Box<dyn ChatServiceError>>;

type BoxedChatFuture = Pin<Box<dyn Future<Output = ChatResult> + Send>>;
type HandlerFn = Arc<dyn Fn(ChatRequest) -> BoxedChatFuture + Send + Sync>;

/// A wrapper around a chat service that provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ChatClient {
    handler_fn: HandlerFn,
}

impl ChatClient {
    /// Wraps `service`.
    #[inline]
    pub fn new<S: ChatService + 'static>(service: S) -> Self {
        // Erase `S` here so the conversation state doesn't need a generic
        // parameter.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = service.send_message(&req);
            Box::pin(
                async move {
                    trace!("sent a request: {req:?}");
                    match fut.await {
                        Ok(reply) => {
                            trace!("got a reply");
                            Ok(reply.reply)
                        }
                        Err(err) => {
                            trace!("got an error: {err:?}");
                            Err(Box::new(err) as Box<dyn ChatServiceError>)
                        }
                    }
                }
                .instrument(trace_span!("chat client req")),
            )
        });
        Self { handler_fn }
    }

    /// Issues a request and returns a future of its result.
    ///
    /// The request is handed to the service before this method returns.
    /// The returned future doesn't borrow the client.
    ///
    /// If the service panics while issuing the request, the returned future
    /// resolves to an error instead.
    pub fn send_request(
        &self,
        req: ChatRequest,
    ) -> impl Future<Output = ChatResult> + Send + 'static {
        let handler_fn = &self.handler_fn;
        match panic::catch_unwind(AssertUnwindSafe(|| handler_fn(req))) {
            Ok(fut) => fut,
            Err(_) => {
                error!("chat service panicked while issuing a request");
                let fut: BoxedChatFuture =
                    Box::pin(async { ChatResult::Err(Box::new(Interrupted)) });
                fut
            }
        }
    }
}

/// The request task ended without producing a result.
#[derive(Debug)]
pub(crate) struct Interrupted;

impl Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the request ended without a response")
    }
}

impl Error for Interrupted {}

impl ChatServiceError for Interrupted {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}
