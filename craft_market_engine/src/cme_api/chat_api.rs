use std::fmt::Debug;

use log::*;

use crate::{
    cme_api::chat_objects::{ConversationDetails, ConversationSummary},
    db_types::{Conversation, Message, NewMessage, Role},
    traits::{ChatApiError, ConversationEntry, MessageManagement, ProfileManagement},
};

/// `ChatApi` drives the buyer–artisan messaging model: one persistent thread per pair of users,
/// per-participant read pointers, and a binary unread flag per conversation.
pub struct ChatApi<B> {
    db: B,
}

impl<B> Debug for ChatApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChatApi")
    }
}

impl<B> ChatApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ChatApi<B>
where B: MessageManagement + ProfileManagement
{
    /// Fetches the conversation between the caller and `other_id`, creating it on first use.
    ///
    /// The caller's stored role must match `caller_role`, and the counterpart must carry the
    /// opposite role; a conversation is always exactly one buyer plus one artisan. Concurrent
    /// calls for the same pair converge on a single conversation.
    pub async fn get_or_create_conversation(
        &self,
        caller_id: i64,
        caller_role: Role,
        other_id: i64,
    ) -> Result<Conversation, ChatApiError> {
        let caller = self.db.fetch_user(caller_id).await?.ok_or(ChatApiError::UserNotFound(caller_id))?;
        let other = self.db.fetch_user(other_id).await?.ok_or(ChatApiError::UserNotFound(other_id))?;
        if caller.role != caller_role {
            return Err(ChatApiError::InvalidParticipants(format!(
                "user #{caller_id} is a {}, not a {caller_role}",
                caller.role
            )));
        }
        if other.role != caller_role.opposite() {
            return Err(ChatApiError::InvalidParticipants(
                "a conversation needs one buyer and one artisan".to_string(),
            ));
        }
        let (buyer_id, artisan_id) = match caller_role {
            Role::Buyer => (caller.id, other.id),
            Role::Artisan => (other.id, caller.id),
        };
        let conversation = self.db.get_or_create_conversation(buyer_id, artisan_id).await?;
        trace!("💬️ Conversation #{} between buyer #{buyer_id} and artisan #{artisan_id}", conversation.id);
        Ok(conversation)
    }

    /// Sends a message into a conversation the sender participates in.
    ///
    /// In one atomic unit the message is stored, `last_message_id` moves to it, the sender's
    /// read pointer follows (they have trivially read their own message) and the recipient's
    /// pointer is cleared, marking the conversation unread for them.
    pub async fn send_message(
        &self,
        conversation_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<Message, ChatApiError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatApiError::EmptyMessage);
        }
        let conversation = self.conversation(conversation_id).await?;
        let sender_role = conversation.role_of(sender_id).ok_or_else(|| {
            warn!("💬️ User #{sender_id} tried to post into conversation #{conversation_id} they are not part of");
            ChatApiError::NotAParticipant(conversation_id)
        })?;
        let message = NewMessage { conversation_id, sender_id, sender_role, content: content.to_string() };
        let message = self.db.insert_message(message).await?;
        debug!("💬️ Message #{} sent by {} #{sender_id} in conversation #{conversation_id}", message.id, sender_role);
        Ok(message)
    }

    /// Stamps the caller's read pointer with the newest message in the conversation.
    ///
    /// The newest message is looked up by creation order rather than trusting
    /// `last_message_id`, so a racing send cannot leave the pointer behind the true head.
    /// A conversation with no messages is a no-op.
    pub async fn mark_conversation_read(&self, conversation_id: i64, user_id: i64) -> Result<(), ChatApiError> {
        let conversation = self.conversation(conversation_id).await?;
        if !conversation.is_participant(user_id) {
            return Err(ChatApiError::NotAParticipant(conversation_id));
        }
        if let Some(latest) = self.db.fetch_latest_message(conversation_id).await? {
            self.db.mark_read(conversation_id, user_id, latest.id).await?;
            trace!("💬️ Conversation #{conversation_id} marked read by user #{user_id} up to message #{}", latest.id);
        }
        Ok(())
    }

    /// All of the user's conversations, most recently updated first, each annotated with the
    /// binary unread flag. Malformed rows (missing or same-role participants) are never
    /// surfaced.
    pub async fn conversations_for_user(&self, user_id: i64) -> Result<Vec<ConversationSummary>, ChatApiError> {
        let entries = self.db.fetch_conversations_for_user(user_id).await?;
        let summaries = entries
            .into_iter()
            .map(|entry| {
                let unread_count = unread_flag(&entry);
                ConversationSummary { conversation: entry.conversation, unread_count }
            })
            .collect();
        Ok(summaries)
    }

    /// The number of conversations (not messages) with outstanding unread activity, for the
    /// navigation badge.
    pub async fn unread_conversation_count(&self, user_id: i64) -> Result<i64, ChatApiError> {
        let entries = self.db.fetch_conversations_for_user(user_id).await?;
        Ok(entries.iter().map(unread_flag).sum())
    }

    /// The full message history of a conversation, oldest first. No pagination.
    pub async fn messages_for_conversation(
        &self,
        conversation_id: i64,
        caller_id: i64,
    ) -> Result<Vec<Message>, ChatApiError> {
        let conversation = self.conversation(conversation_id).await?;
        if !conversation.is_participant(caller_id) {
            return Err(ChatApiError::NotAParticipant(conversation_id));
        }
        self.db.fetch_messages(conversation_id).await
    }

    /// A conversation plus both participant profiles, for the chat header.
    pub async fn conversation_details(
        &self,
        conversation_id: i64,
        caller_id: i64,
    ) -> Result<ConversationDetails, ChatApiError> {
        let conversation = self.conversation(conversation_id).await?;
        if !conversation.is_participant(caller_id) {
            return Err(ChatApiError::NotAParticipant(conversation_id));
        }
        let mut participants = Vec::with_capacity(2);
        for user_id in [conversation.buyer_id, conversation.artisan_id] {
            let user = self.db.fetch_user(user_id).await?.ok_or(ChatApiError::UserNotFound(user_id))?;
            participants.push(user);
        }
        Ok(ConversationDetails { conversation, participants })
    }

    async fn conversation(&self, conversation_id: i64) -> Result<Conversation, ChatApiError> {
        self.db
            .fetch_conversation(conversation_id)
            .await?
            .ok_or(ChatApiError::ConversationNotFound(conversation_id))
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// 1 when the conversation's last message exists and differs from the participant's read
/// pointer, else 0. Read state is binary per conversation, not a message count.
fn unread_flag(entry: &ConversationEntry) -> i64 {
    match entry.conversation.last_message_id {
        Some(last) if entry.last_read_message_id != Some(last) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::unread_flag;
    use crate::{db_types::Conversation, traits::ConversationEntry};

    fn entry(last_message_id: Option<i64>, last_read_message_id: Option<i64>) -> ConversationEntry {
        let now = Utc::now();
        let conversation =
            Conversation { id: 1, buyer_id: 10, artisan_id: 20, last_message_id, created_at: now, updated_at: now };
        ConversationEntry { conversation, last_read_message_id }
    }

    #[test]
    fn unread_is_a_binary_flag() {
        // No messages at all: nothing to read.
        assert_eq!(unread_flag(&entry(None, None)), 0);
        // Caught up to the head.
        assert_eq!(unread_flag(&entry(Some(5), Some(5))), 0);
        // Pointer cleared by an incoming message.
        assert_eq!(unread_flag(&entry(Some(5), None)), 1);
        // Pointer lagging the head still counts as a single unread conversation.
        assert_eq!(unread_flag(&entry(Some(5), Some(3))), 1);
    }
}
