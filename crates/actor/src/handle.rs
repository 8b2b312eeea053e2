use std::sync::{Arc, Weak};

use tokio::sync::oneshot;
use tracing::Instrument;

use crate::mailbox::{Envelope, Mailbox, MailboxParts};
use crate::scheduler::run_actor;
use crate::{ActorDeadError, Message, Request};

/// Handle to an actor.
///
/// The actor keeps running as long as at least one handle is alive. Once
/// the last handle is dropped, the actor stops and its state is dropped.
pub struct Actor<S> {
    mailbox: Arc<Mailbox<S>>,
}

impl<S: Send + 'static> Actor<S> {
    /// Spawns a new actor with the specified state and an optional label.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(state: S, label: Option<&str>) -> Self {
        let MailboxParts {
            mailbox,
            msg_rx,
            kill_rx,
        } = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, msg_rx, kill_rx)
                .instrument(trace_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<S>>) -> Self {
        Self { mailbox }
    }

    /// Sends a message to the actor without waiting for it to be handled.
    #[inline]
    pub fn send<M: Message<S> + 'static>(
        &self,
        msg: M,
    ) -> Result<(), ActorDeadError> {
        self.mailbox.send(Box::new(msg))
    }

    /// Sends a request to the actor and waits for its reply.
    ///
    /// The reply is produced right after the actor handles the request, so
    /// every message sent before it has been handled by then too.
    pub async fn call<R: Request<S>>(
        &self,
        request: R,
    ) -> Result<R::Reply, ActorDeadError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Envelope { request, reply_tx })?;
        reply_rx.await.map_err(|_| ActorDeadError)
    }

    /// Attempts to kill the actor.
    ///
    /// The actor is not guaranteed to be killed immediately, but it
    /// will stop handling further messages and quit soon.
    #[inline]
    pub fn try_kill(&self) {
        self.mailbox.try_kill();
    }

    /// Creates a handle that doesn't keep the actor alive.
    #[inline]
    pub fn downgrade(&self) -> WeakActor<S> {
        WeakActor {
            mailbox: Arc::downgrade(&self.mailbox),
        }
    }
}

impl<S> Clone for Actor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}

/// A handle that doesn't keep the actor alive.
///
/// Useful for background tasks that report back to the actor but should
/// not extend its lifetime.
pub struct WeakActor<S> {
    mailbox: Weak<Mailbox<S>>,
}

impl<S: Send + 'static> WeakActor<S> {
    /// Attempts to get a strong handle. Returns `None` if every strong
    /// handle has been dropped.
    #[inline]
    pub fn upgrade(&self) -> Option<Actor<S>> {
        self.mailbox.upgrade().map(Actor::from_mailbox)
    }

    /// Sends a message if the actor is still alive.
    #[inline]
    pub fn send<M: Message<S> + 'static>(
        &self,
        msg: M,
    ) -> Result<(), ActorDeadError> {
        self.upgrade().ok_or(ActorDeadError)?.send(msg)
    }
}

impl<S> Clone for WeakActor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Weak::clone(&self.mailbox),
        }
    }
}
