use serde::{Deserialize, Serialize};

use crate::db_types::{Conversation, User};

/// A conversation as listed for one participant, annotated with their unread flag.
///
/// `unread_count` is not a true message count: it is 1 when the last message exists and differs
/// from the participant's read pointer, else 0, exposed as an integer for UI convenience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub unread_count: i64,
}

/// A conversation together with both participant profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDetails {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub participants: Vec<User>,
}
