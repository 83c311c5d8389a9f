use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::Conversation, traits::ConversationEntry};

pub async fn fetch_conversation(
    conversation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Conversation>, sqlx::Error> {
    let conversation =
        sqlx::query_as("SELECT * FROM conversations WHERE id = $1").bind(conversation_id).fetch_optional(conn).await?;
    Ok(conversation)
}

pub async fn fetch_by_pair(
    buyer_id: i64,
    artisan_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Conversation>, sqlx::Error> {
    let conversation = sqlx::query_as("SELECT * FROM conversations WHERE buyer_id = $1 AND artisan_id = $2")
        .bind(buyer_id)
        .bind(artisan_id)
        .fetch_optional(conn)
        .await?;
    Ok(conversation)
}

/// Inserts the conversation for the pair if it does not exist yet, together with a null read
/// pointer row for each participant. The unique (buyer, artisan) index makes this race-safe:
/// a concurrent insert loses the conflict and both callers re-read the same row.
pub async fn get_or_create(
    buyer_id: i64,
    artisan_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Conversation, sqlx::Error> {
    sqlx::query("INSERT INTO conversations (buyer_id, artisan_id) VALUES ($1, $2) ON CONFLICT (buyer_id, artisan_id) DO NOTHING")
        .bind(buyer_id)
        .bind(artisan_id)
        .execute(&mut *conn)
        .await?;
    let conversation: Conversation = sqlx::query_as("SELECT * FROM conversations WHERE buyer_id = $1 AND artisan_id = $2")
        .bind(buyer_id)
        .bind(artisan_id)
        .fetch_one(&mut *conn)
        .await?;
    for user_id in [buyer_id, artisan_id] {
        sqlx::query(
            "INSERT INTO conversation_reads (conversation_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (conversation_id, user_id) DO NOTHING",
        )
        .bind(conversation.id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    }
    debug!("💬️ Conversation #{} ready for buyer #{buyer_id} / artisan #{artisan_id}", conversation.id);
    Ok(conversation)
}

/// All conversations the user participates in, paired with that user's read pointer, most
/// recently updated first. Rows whose participants are missing or do not carry opposite roles
/// are filtered out here rather than surfaced to callers.
pub async fn fetch_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<ConversationEntry>, sqlx::Error> {
    let entries = sqlx::query_as(
        r#"
        SELECT conversations.*, reads.last_read_message_id AS last_read_message_id
        FROM conversations
        JOIN users buyers ON buyers.id = conversations.buyer_id AND buyers.role = 'Buyer'
        JOIN users artisans ON artisans.id = conversations.artisan_id AND artisans.role = 'Artisan'
        LEFT JOIN conversation_reads reads
            ON reads.conversation_id = conversations.id AND reads.user_id = $1
        WHERE conversations.buyer_id = $1 OR conversations.artisan_id = $1
        ORDER BY conversations.updated_at DESC, conversations.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}

pub(crate) async fn set_last_message(
    conversation_id: i64,
    message_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE conversations SET last_message_id = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(message_id)
        .bind(conversation_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Moves one participant's read pointer. An upsert, so it also repairs a missing pointer row.
pub(crate) async fn stamp_read_pointer(
    conversation_id: i64,
    user_id: i64,
    message_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO conversation_reads (conversation_id, user_id, last_read_message_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (conversation_id, user_id)
        DO UPDATE SET last_read_message_id = excluded.last_read_message_id, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(message_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Clears the read pointer of every participant except the sender: a new message unconditionally
/// marks the conversation unread for its recipients.
pub(crate) async fn clear_other_read_pointers(
    conversation_id: i64,
    sender_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE conversation_reads SET last_read_message_id = NULL, updated_at = CURRENT_TIMESTAMP \
         WHERE conversation_id = $1 AND user_id <> $2",
    )
    .bind(conversation_id)
    .bind(sender_id)
    .execute(conn)
    .await?;
    Ok(())
}
