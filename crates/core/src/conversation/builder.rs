use little_chat_service::ChatService;

use super::Conversation;
use crate::chat_client::ChatClient;

/// [`Conversation`] builder.
pub struct ConversationBuilder {
    pub(crate) client: ChatClient,
    pub(crate) draft: String,
}

impl ConversationBuilder {
    /// Creates a new builder with the specified chat service.
    #[inline]
    pub fn with_service<S: ChatService + 'static>(service: S) -> Self {
        Self::with_client(ChatClient::new(service))
    }

    /// Creates a new builder with an already wrapped chat service.
    #[inline]
    pub fn with_client(client: ChatClient) -> Self {
        Self {
            client,
            draft: String::new(),
        }
    }

    /// Starts the conversation with some text in the draft.
    #[inline]
    pub fn with_draft<S: Into<String>>(mut self, draft: S) -> Self {
        self.draft = draft.into();
        self
    }

    /// Builds the conversation.
    ///
    /// Must be called within a tokio runtime.
    #[inline]
    pub fn build(self) -> Conversation {
        Conversation::spawn_from_builder(self)
    }
}
