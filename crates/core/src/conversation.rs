mod builder;
mod state;
#[cfg(test)]
mod tests;

use little_chat_actor::{Actor, ActorDeadError};
use tokio::sync::watch;

use crate::transcript::Transcript;
pub use builder::ConversationBuilder;
use state::{ConversationState, SendDraft, UpdateDraft};

/// What happened to a [`Conversation::send`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SendOutcome {
    /// The draft was appended to the transcript and sent.
    Sent,
    /// The draft was blank, nothing changed.
    Empty,
    /// A reply is still pending. The call was dropped and nothing changed,
    /// the draft included.
    Busy,
}

/// A read-only view of a conversation at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversationSnapshot {
    pub(crate) transcript: Transcript,
    pub(crate) draft: String,
    pub(crate) busy: bool,
}

impl ConversationSnapshot {
    /// Returns the transcript.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the not-yet-sent input.
    #[inline]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Returns `true` while a reply is pending.
    ///
    /// Renderers should show a pending indicator after the last message
    /// when this is set.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

/// A conversation with a chat service, owning the transcript, the draft,
/// and the busy flag.
///
/// Events are handled one at a time in the order they were issued, on a
/// task of their own. While a reply is pending, the draft can still be
/// edited, but another send is dropped until the reply settles.
///
/// Every change is published as a [`ConversationSnapshot`]. Appending the
/// user message, clearing the draft, and raising the busy flag are
/// published together, as are appending the reply and clearing the flag.
///
/// The conversation lives as long as any of its handles. Dropping the last
/// one discards the state and abandons the pending request, if any.
#[derive(Clone)]
pub struct Conversation {
    handle: Actor<ConversationState>,
    snapshot_rx: watch::Receiver<ConversationSnapshot>,
}

impl Conversation {
    /// Replaces the draft with `text`.
    ///
    /// Like every other event, this is applied asynchronously but before
    /// anything issued after it.
    #[inline]
    pub fn update_draft<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), ActorDeadError> {
        self.handle.send(UpdateDraft(text.into()))
    }

    /// Sends the current draft.
    ///
    /// Returns once the user message is in the transcript and the request
    /// is on its way, without waiting for the reply. The reply (or an
    /// error message) is appended later.
    #[inline]
    pub async fn send(&self) -> Result<SendOutcome, ActorDeadError> {
        self.handle.call(SendDraft).await
    }

    /// Returns the latest snapshot.
    #[inline]
    pub fn snapshot(&self) -> ConversationSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Returns a receiver that gets notified on every change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Waits until no reply is pending and returns that snapshot.
    pub async fn wait_idle(
        &self,
    ) -> Result<ConversationSnapshot, ActorDeadError> {
        let mut snapshot_rx = self.snapshot_rx.clone();
        let snapshot = snapshot_rx
            .wait_for(|snapshot| !snapshot.busy)
            .await
            .map_err(|_| ActorDeadError)?;
        Ok(snapshot.clone())
    }
}

impl Conversation {
    fn spawn_from_builder(builder: ConversationBuilder) -> Self {
        let ConversationBuilder { client, draft } = builder;

        let initial = ConversationSnapshot {
            draft: draft.clone(),
            ..Default::default()
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let state = ConversationState::new(client, draft, snapshot_tx);
        let handle = Actor::spawn(state, Some("conversation"));
        Self {
            handle,
            snapshot_rx,
        }
    }
}
