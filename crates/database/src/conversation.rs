//! Conversation persistence and status state machine.
//!
//! All "open conversation" lookups filter on status `pending` or `active`;
//! that is what keeps one conversation per ongoing customer thread instead
//! of fragmenting history across duplicates.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DatabaseError, Result};
use crate::models::{Conversation, ConversationStatus};

/// Find the open conversation for a customer, if one exists.
pub async fn find_open(pool: &SqlitePool, customer_number: &str) -> Result<Option<Conversation>> {
    let record = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, customer_number, display_name, status, assigned_agent_id, created_by, created_at
        FROM conversations
        WHERE customer_number = ? AND status IN ('pending', 'active')
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(customer_number)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Create a new conversation.
pub async fn create(
    pool: &SqlitePool,
    customer_number: &str,
    display_name: Option<&str>,
    created_by: &str,
    status: ConversationStatus,
) -> Result<Conversation> {
    let result = sqlx::query(
        r#"
        INSERT INTO conversations (customer_number, display_name, status, created_by)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(customer_number)
    .bind(display_name)
    .bind(status)
    .bind(created_by)
    .execute(pool)
    .await?;

    let conversation = get(pool, result.last_insert_rowid()).await?;
    info!(
        conversation = conversation.id,
        customer = %customer_number,
        status = %status,
        "created conversation"
    );
    Ok(conversation)
}

/// Get a conversation by ID.
pub async fn get(pool: &SqlitePool, id: i64) -> Result<Conversation> {
    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, customer_number, display_name, status, assigned_agent_id, created_by, created_at
        FROM conversations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DatabaseError::NotFound {
        entity: "conversation",
        id: id.to_string(),
    })
}

/// Escalate a conversation: move it to `active` and record the agent when
/// nobody is assigned yet. An already-assigned conversation keeps its agent.
pub async fn escalate(pool: &SqlitePool, id: i64, agent_id: Option<i64>) -> Result<Conversation> {
    let conversation = get(pool, id).await?;
    if conversation.status == ConversationStatus::Closed {
        return Err(DatabaseError::AlreadyClosed { id });
    }

    let assignee = conversation.assigned_agent_id.or(agent_id);
    sqlx::query(
        r#"
        UPDATE conversations
        SET status = 'active', assigned_agent_id = ?
        WHERE id = ?
        "#,
    )
    .bind(assignee)
    .bind(id)
    .execute(pool)
    .await?;

    get(pool, id).await
}

/// Assign an agent to a conversation.
///
/// A pending conversation with no assignee becomes active and records the
/// agent. Re-assigning an already-assigned conversation is a no-op unless
/// `reassign` is set (admin-equivalent actors only, enforced by the caller).
pub async fn assign(
    pool: &SqlitePool,
    id: i64,
    agent_id: i64,
    reassign: bool,
) -> Result<Conversation> {
    let conversation = get(pool, id).await?;
    if conversation.status == ConversationStatus::Closed {
        return Err(DatabaseError::AlreadyClosed { id });
    }

    match conversation.assigned_agent_id {
        Some(existing) if existing != agent_id && !reassign => {
            // Keep the current assignee.
            Ok(conversation)
        }
        Some(existing) if existing == agent_id => Ok(conversation),
        _ => {
            sqlx::query(
                r#"
                UPDATE conversations
                SET assigned_agent_id = ?, status = 'active'
                WHERE id = ?
                "#,
            )
            .bind(agent_id)
            .bind(id)
            .execute(pool)
            .await?;
            info!(conversation = id, agent = agent_id, "assigned conversation");
            get(pool, id).await
        }
    }
}

/// Close a conversation.
///
/// Closing an already-closed conversation is rejected with
/// [`DatabaseError::AlreadyClosed`], never silently accepted.
pub async fn close(pool: &SqlitePool, id: i64) -> Result<Conversation> {
    let conversation = get(pool, id).await?;
    if conversation.status == ConversationStatus::Closed {
        return Err(DatabaseError::AlreadyClosed { id });
    }

    sqlx::query("UPDATE conversations SET status = 'closed' WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    info!(conversation = id, "closed conversation");
    get(pool, id).await
}

/// Set a conversation's status explicitly, returning (old, updated).
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: ConversationStatus,
) -> Result<(ConversationStatus, Conversation)> {
    let conversation = get(pool, id).await?;
    let old_status = conversation.status;

    sqlx::query("UPDATE conversations SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

    Ok((old_status, get(pool, id).await?))
}

/// List all conversations, newest first.
pub async fn list(pool: &SqlitePool) -> Result<Vec<Conversation>> {
    let records = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, customer_number, display_name, status, assigned_agent_id, created_by, created_at
        FROM conversations
        ORDER BY id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// List conversations assigned to one agent, newest first.
pub async fn list_for_agent(pool: &SqlitePool, agent_id: i64) -> Result<Vec<Conversation>> {
    let records = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, customer_number, display_name, status, assigned_agent_id, created_by, created_at
        FROM conversations
        WHERE assigned_agent_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(agent_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_pool() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn find_open_sees_pending_and_active_only() {
        let db = test_pool().await;
        let pool = db.pool();

        let conv = create(pool, "+5511999990000", None, "system", ConversationStatus::Pending)
            .await
            .unwrap();
        assert!(find_open(pool, "+5511999990000").await.unwrap().is_some());

        close(pool, conv.id).await.unwrap();
        assert!(find_open(pool, "+5511999990000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn escalate_activates_and_assigns_once() {
        let db = test_pool().await;
        let pool = db.pool();
        let agent = crate::agent::create(pool, "ana@empresa.com", "Ana", "agent")
            .await
            .unwrap();
        let other = crate::agent::create(pool, "beto@empresa.com", "Beto", "agent")
            .await
            .unwrap();

        let conv = create(pool, "+5511999990000", None, "system", ConversationStatus::Pending)
            .await
            .unwrap();

        let escalated = escalate(pool, conv.id, Some(agent.id)).await.unwrap();
        assert_eq!(escalated.status, ConversationStatus::Active);
        assert_eq!(escalated.assigned_agent_id, Some(agent.id));

        // Second escalation keeps the original assignee.
        let again = escalate(pool, conv.id, Some(other.id)).await.unwrap();
        assert_eq!(again.assigned_agent_id, Some(agent.id));
    }

    #[tokio::test]
    async fn close_rejects_already_closed() {
        let db = test_pool().await;
        let pool = db.pool();

        let conv = create(pool, "+5511999990000", None, "system", ConversationStatus::Pending)
            .await
            .unwrap();
        close(pool, conv.id).await.unwrap();

        let result = close(pool, conv.id).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyClosed { .. })));
    }

    #[tokio::test]
    async fn assign_is_noop_without_reassign_flag() {
        let db = test_pool().await;
        let pool = db.pool();
        let ana = crate::agent::create(pool, "ana@empresa.com", "Ana", "agent")
            .await
            .unwrap();
        let beto = crate::agent::create(pool, "beto@empresa.com", "Beto", "agent")
            .await
            .unwrap();

        let conv = create(pool, "+5511999990000", None, "system", ConversationStatus::Pending)
            .await
            .unwrap();

        let assigned = assign(pool, conv.id, ana.id, false).await.unwrap();
        assert_eq!(assigned.status, ConversationStatus::Active);
        assert_eq!(assigned.assigned_agent_id, Some(ana.id));

        // Non-admin re-assignment keeps Ana.
        let kept = assign(pool, conv.id, beto.id, false).await.unwrap();
        assert_eq!(kept.assigned_agent_id, Some(ana.id));

        // Explicit reassignment moves it.
        let moved = assign(pool, conv.id, beto.id, true).await.unwrap();
        assert_eq!(moved.assigned_agent_id, Some(beto.id));
    }

    #[tokio::test]
    async fn missing_conversation_is_not_found() {
        let db = test_pool().await;
        let result = get(db.pool(), 42).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
