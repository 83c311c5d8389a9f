use thiserror::Error;

use crate::{
    db_types::{Conversation, Message, NewMessage},
    traits::{data_objects::ConversationEntry, ProfileApiError},
};

/// Storage contract for conversations, messages and per-participant read pointers.
///
/// Read state is a mapping from participant id to the last message that participant has seen
/// (nullable). A conversation is "unread" for a participant when its last message exists and
/// differs from their pointer.
#[allow(async_fn_in_trait)]
pub trait MessageManagement {
    /// Fetches the conversation for the given buyer/artisan pair, creating it (with null read
    /// pointers for both participants) if it does not exist. Concurrent calls for the same pair
    /// must converge on a single conversation.
    async fn get_or_create_conversation(&self, buyer_id: i64, artisan_id: i64) -> Result<Conversation, ChatApiError>;

    async fn fetch_conversation(&self, conversation_id: i64) -> Result<Option<Conversation>, ChatApiError>;

    /// All conversations the user participates in, each paired with that user's read pointer,
    /// most recently updated first. Rows whose participants are missing or share a role are not
    /// returned.
    async fn fetch_conversations_for_user(&self, user_id: i64) -> Result<Vec<ConversationEntry>, ChatApiError>;

    /// Stores a message and updates the conversation in one atomic unit: `last_message_id` points
    /// at the new message, the sender's read pointer moves to it, and every other participant's
    /// pointer is cleared.
    async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatApiError>;

    /// Full message history for a conversation in ascending creation order.
    async fn fetch_messages(&self, conversation_id: i64) -> Result<Vec<Message>, ChatApiError>;

    /// The true newest message by creation order, independent of `last_message_id`.
    async fn fetch_latest_message(&self, conversation_id: i64) -> Result<Option<Message>, ChatApiError>;

    /// Sets the user's read pointer for the conversation to the given message.
    async fn mark_read(&self, conversation_id: i64, user_id: i64, message_id: i64) -> Result<(), ChatApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum ChatApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Conversation {0} does not exist")]
    ConversationNotFound(i64),
    #[error("User {0} does not exist")]
    UserNotFound(i64),
    #[error("You are not a participant in this conversation")]
    NotAParticipant(i64),
    #[error("Message content is required")]
    EmptyMessage,
    #[error("Invalid conversation participants: {0}")]
    InvalidParticipants(String),
    #[error("{0}")]
    ProfileError(#[from] ProfileApiError),
}

impl From<sqlx::Error> for ChatApiError {
    fn from(e: sqlx::Error) -> Self {
        ChatApiError::DatabaseError(e.to_string())
    }
}
