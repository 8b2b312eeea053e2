use std::sync::Weak;

use tokio::select;
use tokio::sync::{mpsc, watch};

use crate::mailbox::Mailbox;
use crate::{Actor, Message};

pub(crate) async fn run_actor<S: Send + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    mut msg_rx: mpsc::UnboundedReceiver<Box<dyn Message<S>>>,
    mut kill_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let msg = select! {
            biased;

            _ = kill_rx.changed() => {
                debug!("killed");
                break;
            }
            msg = msg_rx.recv() => {
                let Some(msg) = msg else {
                    break;
                };
                msg
            }
        };
        trace!("received message: {msg:?}");

        // Messages still queued after the last handle is gone are stale.
        let Some(mailbox) = mailbox.upgrade() else {
            debug!("all handles have been dropped, discard the message");
            break;
        };

        let handle = Actor::from_mailbox(mailbox);
        trace_span!("proc msg").in_scope(|| {
            msg.handle(&mut state, &handle);
            trace!("finished");
        });
    }
    // Drop the state here so its cleanup runs inside the actor span.
    drop(state);
    debug!("terminated");
}
