use std::time::Duration;

use little_chat_core::{
    ActorDeadError, Conversation, ConversationBuilder, ConversationSnapshot,
    SendOutcome,
};
use little_chat_http_service::{
    Error as HttpError, HEALTH_CHECK_TIMEOUT, HttpChatService,
    HttpServiceConfig, HttpServiceConfigBuilder,
};
use little_chat_service::ChatService;
use tokio::sync::watch;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    conversation_builder: ConversationBuilder,
    http_service: Option<HttpChatService>,
}

impl SessionBuilder {
    /// Creates a session builder talking to the service configured by the
    /// environment.
    ///
    /// See [`HttpServiceConfigBuilder::from_env`].
    #[inline]
    pub fn from_env() -> Self {
        Self::with_config(HttpServiceConfigBuilder::from_env().build())
    }

    /// Creates a session builder talking to an HTTP chat service.
    pub fn with_config(config: HttpServiceConfig) -> Self {
        let service = HttpChatService::new(config);
        Self {
            conversation_builder: ConversationBuilder::with_service(
                service.clone(),
            ),
            http_service: Some(service),
        }
    }

    /// Creates a session builder with any chat service.
    #[inline]
    pub fn with_service<S: ChatService + 'static>(service: S) -> Self {
        Self {
            conversation_builder: ConversationBuilder::with_service(service),
            http_service: None,
        }
    }

    /// Builds a new session.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> Session {
        let conversation = self.conversation_builder.build();
        debug!(
            "session started, base url: {:?}",
            self.http_service
                .as_ref()
                .and_then(|service| service.config().base_url())
        );
        Session {
            conversation,
            http_service: self.http_service,
        }
    }
}

/// A chat session, like a window that displays messages and has an input
/// box.
///
/// The session is basically a wrapper around [`Conversation`].
pub struct Session {
    conversation: Conversation,
    http_service: Option<HttpChatService>,
}

impl Session {
    /// Returns the underlying conversation.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Replaces the text in the input box.
    #[inline]
    pub fn update_draft<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), ActorDeadError> {
        self.conversation.update_draft(text)
    }

    /// Sends what's in the input box.
    #[inline]
    pub async fn send(&self) -> Result<SendOutcome, ActorDeadError> {
        self.conversation.send().await
    }

    /// Types `text` into the input box and sends it.
    ///
    /// If a reply is still pending, `text` stays in the input box and
    /// [`SendOutcome::Busy`] is returned.
    pub async fn submit<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<SendOutcome, ActorDeadError> {
        self.conversation.update_draft(text)?;
        self.conversation.send().await
    }

    /// Returns the latest snapshot.
    #[inline]
    pub fn snapshot(&self) -> ConversationSnapshot {
        self.conversation.snapshot()
    }

    /// Returns a receiver that gets notified on every change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.conversation.subscribe()
    }

    /// Waits until no reply is pending.
    #[inline]
    pub async fn wait_idle(
        &self,
    ) -> Result<ConversationSnapshot, ActorDeadError> {
        self.conversation.wait_idle().await
    }

    /// Checks whether the backend is up, waiting at most
    /// [`HEALTH_CHECK_TIMEOUT`].
    ///
    /// Returns `None` if the session is not backed by an HTTP service.
    #[inline]
    pub async fn check_health(&self) -> Option<Result<(), HttpError>> {
        self.check_health_within(HEALTH_CHECK_TIMEOUT).await
    }

    /// Like [`check_health`], but gives up after `limit`.
    ///
    /// [`check_health`]: Session::check_health
    pub async fn check_health_within(
        &self,
        limit: Duration,
    ) -> Option<Result<(), HttpError>> {
        let service = self.http_service.as_ref()?;
        Some(service.check_health_within(limit).await)
    }

    /// Returns the HTTP service configuration, if any.
    #[inline]
    pub fn http_config(&self) -> Option<&HttpServiceConfig> {
        self.http_service.as_ref().map(HttpChatService::config)
    }
}
