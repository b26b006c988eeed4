//! Message persistence. Rows are append-only.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{Message, MessageKind};

/// Append one message to a conversation and return the stored row.
pub async fn append(
    pool: &SqlitePool,
    conversation_id: i64,
    sender: MessageKind,
    content: &str,
    responder_tier: Option<&str>,
) -> Result<Message> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages (conversation_id, sender, content, responder_tier)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(conversation_id)
    .bind(sender)
    .bind(content)
    .bind(responder_tier)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let message = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, sender, content, responder_tier, created_at
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(message)
}

/// List all messages of a conversation in insertion order.
pub async fn list(pool: &SqlitePool, conversation_id: i64) -> Result<Vec<Message>> {
    let records = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, sender, content, responder_tier, created_at
        FROM messages
        WHERE conversation_id = ?
        ORDER BY id
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Count the messages of a conversation.
pub async fn count(pool: &SqlitePool, conversation_id: i64) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationStatus;
    use crate::Database;

    #[tokio::test]
    async fn append_and_list_in_order() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let pool = db.pool();

        let conv = crate::conversation::create(
            pool,
            "+5511999990000",
            Some("Maria"),
            "system",
            ConversationStatus::Pending,
        )
        .await
        .unwrap();

        append(pool, conv.id, MessageKind::Customer, "Olá", None)
            .await
            .unwrap();
        append(pool, conv.id, MessageKind::Bot, "Olá Maria!", Some("fallback"))
            .await
            .unwrap();

        let messages = list(pool, conv.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, MessageKind::Customer);
        assert_eq!(messages[1].sender, MessageKind::Bot);
        assert_eq!(messages[1].responder_tier.as_deref(), Some("fallback"));
        assert_eq!(count(pool, conv.id).await.unwrap(), 2);
    }
}
