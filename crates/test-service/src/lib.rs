//! A local fake chat service for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use little_chat_service::{
    ChatReply, ChatRequest, ChatService, ChatServiceError, ErrorKind,
};
use tokio::sync::Semaphore;
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    detail: Option<String>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ChatServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<PresetFailure> for Error {
    fn from(failure: PresetFailure) -> Self {
        let kind = failure.kind();
        match failure {
            PresetFailure::Status { code, detail } => Error {
                message: format!("server responded with {code}"),
                kind,
                detail,
            },
            _ => Error {
                message: "simulated failure".to_owned(),
                kind,
                detail: None,
            },
        }
    }
}

#[derive(Default)]
struct Inner {
    script: Mutex<VecDeque<PresetReply>>,
    received: Mutex<Vec<ChatRequest>>,
    gate: Option<Arc<Semaphore>>,
    delay: Option<Duration>,
}

/// A local fake chat service for testing purpose.
///
/// Each request consumes the next preset in the script, in the order the
/// requests are issued. If the script runs out, the request fails.
///
/// Clones share the same script and request log, so a test can keep one
/// clone to inspect what the code under test has sent.
///
/// A gated service holds every response until [`release`] is called,
/// which makes it possible to observe the state while a request is in
/// flight.
///
/// [`release`]: TestChatService::release
#[derive(Clone, Default)]
pub struct TestChatService {
    inner: Arc<Inner>,
}

impl TestChatService {
    /// Creates a service whose responses wait for [`release`].
    ///
    /// [`release`]: TestChatService::release
    pub fn gated() -> Self {
        Self {
            inner: Arc::new(Inner {
                gate: Some(Arc::new(Semaphore::new(0))),
                ..Default::default()
            }),
        }
    }

    /// Creates a service whose responses are delayed by `delay`.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                delay: Some(delay),
                ..Default::default()
            }),
        }
    }

    #[inline]
    pub fn add_preset(&self, preset: PresetReply) {
        lock(&self.inner.script).push_back(preset);
    }

    #[inline]
    pub fn add_reply<S: Into<String>>(&self, reply: S) {
        self.add_preset(PresetReply::reply(reply));
    }

    #[inline]
    pub fn add_failure(&self, failure: PresetFailure) {
        self.add_preset(PresetReply::Failure(failure));
    }

    /// Lets `count` held responses complete. Has no effect on services
    /// that are not gated.
    #[inline]
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.inner.gate {
            gate.add_permits(count);
        }
    }

    /// Returns every request received so far.
    #[inline]
    pub fn received(&self) -> Vec<ChatRequest> {
        lock(&self.inner.received).clone()
    }
}

impl Debug for TestChatService {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestChatService")
            .field("pending_presets", &lock(&self.inner.script).len())
            .field("received", &lock(&self.inner.received).len())
            .finish_non_exhaustive()
    }
}

impl ChatService for TestChatService {
    type Error = crate::Error;

    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static
    {
        lock(&self.inner.received).push(req.clone());
        let preset = lock(&self.inner.script).pop_front();
        let gate = self.inner.gate.clone();
        let delay = self.inner.delay;

        async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire_owned().await {
                    permit.forget();
                }
            }
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match preset {
                Some(PresetReply::Reply(reply)) => Ok(ChatReply { reply }),
                Some(PresetReply::Failure(failure)) => Err(Error::from(failure)),
                None => Err(Error {
                    message: "no enough presets".to_owned(),
                    kind: ErrorKind::Other,
                    detail: None,
                }),
            }
        }
    }
}

#[inline]
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
