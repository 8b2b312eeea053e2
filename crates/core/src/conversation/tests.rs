use std::time::Duration;

use little_chat_service::{ChatReply, ChatRequest, ChatService};
use little_chat_test_service::{PresetFailure, TestChatService};
use tokio::time::timeout;

use super::*;
use crate::{ConversationBuilder, ERROR_REPLY, Message, Role};

const WAIT: Duration = Duration::from_millis(500);

async fn settle(conversation: &Conversation) -> ConversationSnapshot {
    timeout(WAIT, conversation.wait_idle())
        .await
        .expect("reply did not settle in time")
        .unwrap()
}

async fn submit(conversation: &Conversation, text: &str) -> SendOutcome {
    conversation.update_draft(text).unwrap();
    conversation.send().await.unwrap()
}

fn messages(snapshot: &ConversationSnapshot) -> Vec<Message> {
    snapshot.transcript().messages().to_vec()
}

#[tokio::test]
async fn test_simple_message() {
    let service = TestChatService::default();
    service.add_reply("hi there");
    let conversation = ConversationBuilder::with_service(service.clone()).build();

    assert_eq!(submit(&conversation, "hello").await, SendOutcome::Sent);
    let snapshot = settle(&conversation).await;

    assert_eq!(
        messages(&snapshot),
        [Message::user("hello"), Message::assistant("hi there")]
    );
    assert!(!snapshot.is_busy());
    assert_eq!(snapshot.draft(), "");
    assert_eq!(service.received(), [ChatRequest::new("hello")]);
}

#[tokio::test]
async fn test_server_error() {
    let service = TestChatService::default();
    service.add_failure(PresetFailure::Status {
        code: 500,
        detail: Some("boom".to_owned()),
    });
    let conversation = ConversationBuilder::with_service(service).build();

    submit(&conversation, "bad").await;
    let snapshot = settle(&conversation).await;

    assert_eq!(
        messages(&snapshot),
        [Message::user("bad"), Message::assistant(ERROR_REPLY)]
    );
    assert!(!snapshot.is_busy());
}

#[tokio::test]
async fn test_every_failure_reads_the_same() {
    let service = TestChatService::default();
    service.add_failure(PresetFailure::Transport);
    service.add_failure(PresetFailure::Decode);
    service.add_failure(PresetFailure::Timeout);
    // The fourth request finds the script empty.
    let conversation = ConversationBuilder::with_service(service).build();

    for text in ["x", "y", "z", "w"] {
        assert_eq!(submit(&conversation, text).await, SendOutcome::Sent);
        settle(&conversation).await;
    }

    let snapshot = conversation.snapshot();
    assert_eq!(snapshot.transcript().len(), 8);
    for pair in snapshot.transcript().messages().chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1], Message::assistant(ERROR_REPLY));
    }
}

#[tokio::test]
async fn test_blank_draft_is_ignored() {
    let service = TestChatService::default();
    let conversation = ConversationBuilder::with_service(service.clone()).build();

    for text in ["", "   ", "\n\t "] {
        assert_eq!(submit(&conversation, text).await, SendOutcome::Empty);
        let snapshot = conversation.snapshot();
        assert!(snapshot.transcript().is_empty());
        assert!(!snapshot.is_busy());
        assert_eq!(snapshot.draft(), text);
    }
    assert!(service.received().is_empty());
}

#[tokio::test]
async fn test_message_is_sent_untrimmed() {
    let service = TestChatService::default();
    service.add_reply("  spaced reply  ");
    let conversation = ConversationBuilder::with_service(service.clone()).build();

    submit(&conversation, "  hello\n").await;
    let snapshot = settle(&conversation).await;

    assert_eq!(service.received(), [ChatRequest::new("  hello\n")]);
    assert_eq!(
        messages(&snapshot),
        [
            Message::user("  hello\n"),
            Message::assistant("  spaced reply  ")
        ]
    );
}

#[tokio::test]
async fn test_draft_is_cleared_before_reply() {
    let service = TestChatService::gated();
    service.add_reply("hi there");
    let conversation = ConversationBuilder::with_service(service.clone()).build();

    assert_eq!(submit(&conversation, "hello").await, SendOutcome::Sent);

    // The reply is held, but the send has already been applied.
    let snapshot = conversation.snapshot();
    assert_eq!(snapshot.draft(), "");
    assert!(snapshot.is_busy());
    assert_eq!(messages(&snapshot), [Message::user("hello")]);
    assert_eq!(service.received(), [ChatRequest::new("hello")]);

    service.release(1);
    let snapshot = settle(&conversation).await;
    assert_eq!(snapshot.transcript().len(), 2);
    assert!(!snapshot.is_busy());
}

#[tokio::test]
async fn test_typing_while_waiting() {
    let service = TestChatService::gated();
    service.add_reply("reply to first");
    let conversation = ConversationBuilder::with_service(service.clone()).build();

    submit(&conversation, "first").await;
    conversation.update_draft("second").unwrap();

    let mut snapshot_rx = conversation.subscribe();
    let snapshot = timeout(WAIT, snapshot_rx.wait_for(|s| s.draft() == "second"))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert!(snapshot.is_busy());
    assert_eq!(service.received(), [ChatRequest::new("first")]);

    service.release(1);
    let snapshot = settle(&conversation).await;
    assert_eq!(
        messages(&snapshot),
        [Message::user("first"), Message::assistant("reply to first")]
    );
    assert_eq!(snapshot.draft(), "second");
}

#[tokio::test]
async fn test_send_while_busy_is_dropped() {
    let service = TestChatService::gated();
    service.add_reply("one");
    service.add_reply("two");
    let conversation = ConversationBuilder::with_service(service.clone()).build();

    assert_eq!(submit(&conversation, "first").await, SendOutcome::Sent);
    assert_eq!(submit(&conversation, "again").await, SendOutcome::Busy);

    let snapshot = conversation.snapshot();
    assert_eq!(messages(&snapshot), [Message::user("first")]);
    assert_eq!(snapshot.draft(), "again");
    assert_eq!(service.received().len(), 1);

    service.release(1);
    settle(&conversation).await;

    // The kept draft goes out on the next send.
    assert_eq!(conversation.send().await.unwrap(), SendOutcome::Sent);
    service.release(1);
    let snapshot = settle(&conversation).await;
    assert_eq!(
        messages(&snapshot),
        [
            Message::user("first"),
            Message::assistant("one"),
            Message::user("again"),
            Message::assistant("two"),
        ]
    );
}

#[tokio::test]
async fn test_busy_brackets_the_request() {
    let service = TestChatService::with_delay(Duration::from_millis(5));
    for i in 0..3 {
        service.add_reply(format!("reply {i}"));
    }
    let conversation = ConversationBuilder::with_service(service).build();

    let mut snapshot_rx = conversation.subscribe();
    let observer = tokio::spawn(async move {
        let mut observed = Vec::new();
        while snapshot_rx.changed().await.is_ok() {
            let snapshot = snapshot_rx.borrow_and_update().clone();
            let done = snapshot.transcript().len() == 6 && !snapshot.is_busy();
            observed.push(snapshot);
            if done {
                break;
            }
        }
        observed
    });

    for i in 0..3 {
        submit(&conversation, &format!("message {i}")).await;
        settle(&conversation).await;
    }

    let observed = timeout(WAIT, observer).await.unwrap().unwrap();
    let mut last_len = 0;
    for snapshot in &observed {
        let transcript = snapshot.transcript();
        assert!(transcript.len() >= last_len);
        last_len = transcript.len();

        let waiting_for_reply =
            transcript.last().map(Message::role) == Some(Role::User);
        assert_eq!(snapshot.is_busy(), waiting_for_reply);
    }
    assert_eq!(last_len, 6);
}

struct PanickingService;

impl ChatService for PanickingService {
    type Error = little_chat_test_service::Error;

    fn send_message(
        &self,
        _req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static
    {
        let explode = true;
        async move {
            if explode {
                panic!("backend exploded");
            }
            Ok::<_, Self::Error>(ChatReply {
                reply: String::new(),
            })
        }
    }
}

#[tokio::test]
async fn test_busy_is_released_when_request_panics() {
    let conversation = ConversationBuilder::with_service(PanickingService).build();

    submit(&conversation, "x").await;
    let snapshot = settle(&conversation).await;

    assert_eq!(
        messages(&snapshot),
        [Message::user("x"), Message::assistant(ERROR_REPLY)]
    );
}

// Replies with the message, but panics before issuing a request for
// "explode".
struct IssuePanicService;

impl ChatService for IssuePanicService {
    type Error = little_chat_test_service::Error;

    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static
    {
        assert_ne!(req.message, "explode", "cannot issue the request");
        let reply = req.message.clone();
        async move { Ok::<_, Self::Error>(ChatReply { reply }) }
    }
}

#[tokio::test]
async fn test_conversation_survives_panic_while_issuing() {
    let conversation = ConversationBuilder::with_service(IssuePanicService).build();

    assert_eq!(submit(&conversation, "explode").await, SendOutcome::Sent);
    let snapshot = settle(&conversation).await;
    assert_eq!(
        messages(&snapshot),
        [Message::user("explode"), Message::assistant(ERROR_REPLY)]
    );

    assert_eq!(submit(&conversation, "still here?").await, SendOutcome::Sent);
    let snapshot = settle(&conversation).await;
    assert_eq!(
        snapshot.transcript().last(),
        Some(&Message::assistant("still here?"))
    );
    assert_eq!(snapshot.transcript().len(), 4);
}

#[tokio::test]
async fn test_initial_draft() {
    let service = TestChatService::default();
    service.add_reply("ok");
    let conversation = ConversationBuilder::with_service(service)
        .with_draft("prefilled")
        .build();

    assert_eq!(conversation.snapshot().draft(), "prefilled");
    assert_eq!(conversation.send().await.unwrap(), SendOutcome::Sent);
    let snapshot = settle(&conversation).await;
    assert_eq!(snapshot.transcript().messages()[0], Message::user("prefilled"));
}

#[tokio::test]
async fn test_teardown_while_waiting() {
    let service = TestChatService::gated();
    service.add_reply("never delivered");
    let conversation = ConversationBuilder::with_service(service.clone()).build();

    submit(&conversation, "hello").await;
    let mut snapshot_rx = conversation.subscribe();
    drop(conversation);

    // The state is dropped without waiting for the held reply.
    timeout(WAIT, async {
        while snapshot_rx.changed().await.is_ok() {}
    })
    .await
    .unwrap();
    assert_eq!(snapshot_rx.borrow().transcript().len(), 1);
}
