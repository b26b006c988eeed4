//! Agent records and least-busy assignment.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Agent;

/// Create an agent.
pub async fn create(pool: &SqlitePool, email: &str, name: &str, role: &str) -> Result<Agent> {
    let result = sqlx::query("INSERT INTO agents (email, name, role) VALUES (?, ?, ?)")
        .bind(email)
        .bind(name)
        .bind(role)
        .execute(pool)
        .await?;

    get(pool, result.last_insert_rowid()).await
}

/// Get an agent by ID.
pub async fn get(pool: &SqlitePool, id: i64) -> Result<Agent> {
    sqlx::query_as::<_, Agent>("SELECT id, email, name, role FROM agents WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "agent",
            id: id.to_string(),
        })
}

/// List all agents.
pub async fn list(pool: &SqlitePool) -> Result<Vec<Agent>> {
    let records =
        sqlx::query_as::<_, Agent>("SELECT id, email, name, role FROM agents ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(records)
}

/// The agent with the fewest pending conversations, if any agent exists.
pub async fn least_busy(pool: &SqlitePool) -> Result<Option<Agent>> {
    let record = sqlx::query_as::<_, Agent>(
        r#"
        SELECT a.id, a.email, a.name, a.role
        FROM agents a
        WHERE a.role = 'agent'
        ORDER BY (
            SELECT COUNT(*) FROM conversations c
            WHERE c.assigned_agent_id = a.id AND c.status = 'pending'
        ) ASC, a.id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationStatus;
    use crate::Database;

    #[tokio::test]
    async fn least_busy_prefers_less_loaded_agent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let pool = db.pool();

        let ana = create(pool, "ana@empresa.com", "Ana", "agent").await.unwrap();
        let beto = create(pool, "beto@empresa.com", "Beto", "agent").await.unwrap();

        // Load Ana with a pending conversation.
        let conv = crate::conversation::create(
            pool,
            "+5511111111111",
            None,
            "system",
            ConversationStatus::Pending,
        )
        .await
        .unwrap();
        crate::conversation::assign(pool, conv.id, ana.id, false).await.unwrap();

        // Ana's conversation went active on assignment, so both are tied on
        // pending count and the lowest id wins.
        let picked = least_busy(pool).await.unwrap().unwrap();
        assert_eq!(picked.id, ana.id);

        // Park a pending conversation on Ana without activating it.
        let parked = crate::conversation::create(
            pool,
            "+5522222222222",
            None,
            "system",
            ConversationStatus::Pending,
        )
        .await
        .unwrap();
        sqlx::query("UPDATE conversations SET assigned_agent_id = ? WHERE id = ?")
            .bind(ana.id)
            .bind(parked.id)
            .execute(pool)
            .await
            .unwrap();

        let picked = least_busy(pool).await.unwrap().unwrap();
        assert_eq!(picked.id, beto.id);
    }

    #[tokio::test]
    async fn least_busy_without_agents_is_none() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        assert!(least_busy(db.pool()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admins_are_not_picked_for_escalation() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let pool = db.pool();

        create(pool, "root@empresa.com", "Root", "admin").await.unwrap();
        assert!(least_busy(pool).await.unwrap().is_none());
    }
}
