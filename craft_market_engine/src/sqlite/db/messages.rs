use sqlx::SqliteConnection;

use crate::db_types::{Message, NewMessage};

pub async fn insert_message(message: NewMessage, conn: &mut SqliteConnection) -> Result<Message, sqlx::Error> {
    let message = sqlx::query_as(
        "INSERT INTO messages (conversation_id, sender_id, sender_role, content) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(message.conversation_id)
    .bind(message.sender_id)
    .bind(message.sender_role.to_string())
    .bind(message.content)
    .fetch_one(conn)
    .await?;
    Ok(message)
}

/// Full history for a conversation in ascending creation order. The id tiebreak keeps messages
/// written within the same second in insertion order.
pub async fn fetch_messages(conversation_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Message>, sqlx::Error> {
    let messages =
        sqlx::query_as("SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC")
            .bind(conversation_id)
            .fetch_all(conn)
            .await?;
    Ok(messages)
}

/// The true newest message by creation order, looked up independently of the conversation's
/// `last_message_id` so read-stamping is robust to races.
pub async fn fetch_latest_message(
    conversation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Message>, sqlx::Error> {
    let message = sqlx::query_as(
        "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(conversation_id)
    .fetch_optional(conn)
    .await?;
    Ok(message)
}
