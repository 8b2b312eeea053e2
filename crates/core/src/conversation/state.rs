use std::mem;

use little_chat_actor::{Actor, Message, Request, WeakActor};
use little_chat_service::ChatRequest;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::{ConversationSnapshot, SendOutcome};
use crate::chat_client::{ChatClient, ChatResult, Interrupted};
use crate::transcript::{ERROR_REPLY, Message as TranscriptMessage, Transcript};

#[derive(Default)]
enum Stage {
    #[default]
    Idle,
    Waiting(InFlight),
}

struct InFlight {
    request_id: u64,
    task: JoinHandle<()>,
}

pub struct ConversationState {
    client: ChatClient,
    transcript: Transcript,
    draft: String,
    stage: Stage,
    next_request_id: u64,
    snapshot_tx: watch::Sender<ConversationSnapshot>,
}

impl ConversationState {
    pub fn new(
        client: ChatClient,
        draft: String,
        snapshot_tx: watch::Sender<ConversationSnapshot>,
    ) -> Self {
        Self {
            client,
            transcript: Default::default(),
            draft,
            stage: Default::default(),
            next_request_id: 1,
            snapshot_tx,
        }
    }

    #[inline]
    fn is_busy(&self) -> bool {
        matches!(self.stage, Stage::Waiting(_))
    }

    #[inline]
    fn update_draft(&mut self, text: String) {
        self.draft = text;
        self.publish();
    }

    fn send_draft(&mut self, handle: &Actor<Self>) -> SendOutcome {
        if self.draft.trim().is_empty() {
            trace!("draft is blank, nothing to send");
            return SendOutcome::Empty;
        }
        if self.is_busy() {
            debug!("a reply is still pending, dropping the send");
            return SendOutcome::Busy;
        }

        // The request carries the text as it is now. Later edits only
        // touch the draft.
        let message = mem::take(&mut self.draft);
        self.transcript.push(TranscriptMessage::user(message.clone()));

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        debug!("sending request {request_id}");

        let resp_fut = self.client.send_request(ChatRequest::new(message));
        let settlement = Settlement {
            handle: handle.downgrade(),
            request_id,
            settled: false,
        };
        let task = tokio::spawn(
            async move {
                let result = resp_fut.await;
                settlement.settle(result);
            }
            .instrument(debug_span!("chat request", id = request_id)),
        );
        self.stage = Stage::Waiting(InFlight { request_id, task });

        self.publish();
        SendOutcome::Sent
    }

    fn settle_reply(&mut self, request_id: u64, result: ChatResult) {
        match &self.stage {
            Stage::Waiting(in_flight) if in_flight.request_id == request_id => {}
            _ => {
                warn!("got a result for request {request_id} which is not pending");
                return;
            }
        }

        let content = match result {
            Ok(reply) => {
                debug!("request {request_id} succeeded");
                reply
            }
            Err(err) => {
                error!(
                    kind = %err.kind(),
                    detail = err.detail(),
                    "request {request_id} failed: {err}"
                );
                ERROR_REPLY.to_owned()
            }
        };
        self.transcript.push(TranscriptMessage::assistant(content));
        self.stage = Stage::Idle;

        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(ConversationSnapshot {
            transcript: self.transcript.clone(),
            draft: self.draft.clone(),
            busy: self.is_busy(),
        });
    }
}

impl Drop for ConversationState {
    fn drop(&mut self) {
        if let Stage::Waiting(in_flight) = &self.stage {
            debug!("abandoning request {}", in_flight.request_id);
            in_flight.task.abort();
        }
    }
}

/// Reports the result of a request back to the conversation.
///
/// If the request task ends without reporting, whether it panicked or got
/// aborted, the drop handler reports a failure instead, so the busy flag
/// is always cleared.
struct Settlement {
    handle: WeakActor<ConversationState>,
    request_id: u64,
    settled: bool,
}

impl Settlement {
    fn settle(mut self, result: ChatResult) {
        self.settled = true;
        self.report(result);
    }

    fn report(&self, result: ChatResult) {
        let msg = ReplySettled {
            request_id: self.request_id,
            result,
        };
        if self.handle.send(msg).is_err() {
            debug!("conversation is gone, dropping the result");
        }
    }
}

impl Drop for Settlement {
    fn drop(&mut self) {
        if !self.settled {
            warn!("request {} ended without a result", self.request_id);
            self.report(Err(Box::new(Interrupted)));
        }
    }
}

#[derive(Debug)]
pub struct UpdateDraft(pub String);

impl Message<ConversationState> for UpdateDraft {
    #[inline]
    fn handle(
        self,
        state: &mut ConversationState,
        _handle: &Actor<ConversationState>,
    ) {
        state.update_draft(self.0);
    }
}

#[derive(Debug)]
pub struct SendDraft;

impl Request<ConversationState> for SendDraft {
    type Reply = SendOutcome;

    #[inline]
    fn handle(
        self,
        state: &mut ConversationState,
        handle: &Actor<ConversationState>,
    ) -> SendOutcome {
        state.send_draft(handle)
    }
}

#[derive(Debug)]
struct ReplySettled {
    request_id: u64,
    result: ChatResult,
}

impl Message<ConversationState> for ReplySettled {
    #[inline]
    fn handle(
        self,
        state: &mut ConversationState,
        _handle: &Actor<ConversationState>,
    ) {
        state.settle_reply(self.request_id, self.result);
    }
}
