use std::fmt::{self, Debug};

use tokio::sync::{mpsc, oneshot, watch};

use crate::{Actor, ActorDeadError};

/// Helper trait for handling boxed messages.
pub trait BoxMessage<S>: Send + Debug + 'static {
    fn handle_box(self: Box<Self>, state: &mut S, handle: &Actor<S>);
}

/// The message that an actor can handle.
pub trait Message<S>: BoxMessage<S> {
    /// Handles the message with mutable access to the actor's state.
    fn handle(self, state: &mut S, handle: &Actor<S>);
}

impl<S, M: Message<S>> BoxMessage<S> for M {
    #[inline]
    fn handle_box(self: Box<Self>, state: &mut S, handle: &Actor<S>) {
        (*self).handle(state, handle)
    }
}

impl<S, M: Message<S> + ?Sized> Message<S> for Box<M> {
    #[inline]
    fn handle(self, state: &mut S, handle: &Actor<S>) {
        self.handle_box(state, handle)
    }
}

/// A message that produces a reply for the sender.
///
/// Requests are delivered through the same mailbox as other messages, so
/// they are handled in the order they were sent. Use [`Actor::call`] to
/// send one and wait for its reply.
pub trait Request<S>: Send + Debug + 'static {
    /// The type of the reply.
    type Reply: Send + 'static;

    /// Handles the request with mutable access to the actor's state.
    fn handle(self, state: &mut S, handle: &Actor<S>) -> Self::Reply;
}

/// Carries a request and the channel its reply goes back through.
pub(crate) struct Envelope<R, T> {
    pub request: R,
    pub reply_tx: oneshot::Sender<T>,
}

impl<R: Debug, T> Debug for Envelope<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl<S, R, T> Message<S> for Envelope<R, T>
where
    R: Request<S, Reply = T>,
    T: Send + 'static,
{
    #[inline]
    fn handle(self, state: &mut S, handle: &Actor<S>) {
        let reply = self.request.handle(state, handle);
        if self.reply_tx.send(reply).is_err() {
            trace!("caller is gone, dropping the reply");
        }
    }
}

pub(crate) struct MailboxParts<S> {
    pub mailbox: Mailbox<S>,
    pub msg_rx: mpsc::UnboundedReceiver<Box<dyn Message<S>>>,
    pub kill_rx: watch::Receiver<bool>,
}

pub(crate) struct Mailbox<S> {
    msg_tx: mpsc::UnboundedSender<Box<dyn Message<S>>>,
    kill_tx: watch::Sender<bool>,
}

impl<S: Send + 'static> Mailbox<S> {
    #[inline]
    pub fn new() -> MailboxParts<S> {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);
        MailboxParts {
            mailbox: Mailbox { msg_tx, kill_tx },
            msg_rx,
            kill_rx,
        }
    }

    #[inline]
    pub fn send(&self, msg: Box<dyn Message<S>>) -> Result<(), ActorDeadError> {
        self.msg_tx.send(msg).map_err(|_| ActorDeadError)
    }

    #[inline]
    pub fn try_kill(&self) {
        self.kill_tx.send(true).ok();
    }
}
