//! Bot interaction records: analytics and rate-limit accounting.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::models::{BotInteraction, NewBotInteraction};

/// Record one automated turn. Rows are never updated afterwards.
pub async fn record(pool: &SqlitePool, interaction: &NewBotInteraction<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO bot_interactions
            (customer_phone, customer_name, user_message, bot_response,
             responder_tier, escalated, escalation_reason)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(interaction.customer_phone)
    .bind(interaction.customer_name)
    .bind(interaction.user_message)
    .bind(interaction.bot_response)
    .bind(interaction.responder_tier)
    .bind(interaction.escalated)
    .bind(interaction.escalation_reason)
    .execute(pool)
    .await?;

    debug!(
        customer = %interaction.customer_phone,
        tier = %interaction.responder_tier,
        escalated = interaction.escalated,
        "recorded bot interaction"
    );
    Ok(())
}

/// Interactions recorded for a customer since the start of the current day.
pub async fn count_today(pool: &SqlitePool, customer_phone: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM bot_interactions
        WHERE customer_phone = ? AND created_at >= datetime('now', 'start of day')
        "#,
    )
    .bind(customer_phone)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Interactions recorded for a customer in the trailing hour.
pub async fn count_last_hour(pool: &SqlitePool, customer_phone: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM bot_interactions
        WHERE customer_phone = ? AND created_at >= datetime('now', '-1 hour')
        "#,
    )
    .bind(customer_phone)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// List the interactions of one customer, newest first.
pub async fn list_for_customer(
    pool: &SqlitePool,
    customer_phone: &str,
    limit: i64,
) -> Result<Vec<BotInteraction>> {
    let records = sqlx::query_as::<_, BotInteraction>(
        r#"
        SELECT id, customer_phone, customer_name, user_message, bot_response,
               responder_tier, escalated, escalation_reason, created_at
        FROM bot_interactions
        WHERE customer_phone = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(customer_phone)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Aggregated view of automated handling, for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    /// Total automated turns recorded.
    pub total_interactions: i64,
    /// How many of those escalated.
    pub escalated_interactions: i64,
    /// Share of turns resolved without a human, in percent.
    pub success_rate: f64,
    /// Turn counts per responder tier.
    pub by_tier: Vec<(String, i64)>,
    /// Escalation counts per reason.
    pub by_reason: Vec<(String, i64)>,
    /// Turns recorded in the trailing 24 hours.
    pub last_24h: i64,
}

/// Compute the analytics summary over all recorded interactions.
pub async fn analytics(pool: &SqlitePool) -> Result<AnalyticsSummary> {
    let total_interactions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bot_interactions")
        .fetch_one(pool)
        .await?;

    let escalated_interactions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bot_interactions WHERE escalated = 1")
            .fetch_one(pool)
            .await?;

    let by_tier = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT responder_tier, COUNT(*) FROM bot_interactions
        GROUP BY responder_tier
        ORDER BY COUNT(*) DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let by_reason = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT escalation_reason, COUNT(*) FROM bot_interactions
        WHERE escalated = 1 AND escalation_reason IS NOT NULL
        GROUP BY escalation_reason
        ORDER BY COUNT(*) DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let last_24h: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bot_interactions WHERE created_at >= datetime('now', '-1 day')",
    )
    .fetch_one(pool)
    .await?;

    let success_rate = if total_interactions > 0 {
        (total_interactions - escalated_interactions) as f64 / total_interactions as f64 * 100.0
    } else {
        0.0
    };

    Ok(AnalyticsSummary {
        total_interactions,
        escalated_interactions,
        success_rate,
        by_tier,
        by_reason,
        last_24h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn interaction<'a>(escalated: bool, tier: &'a str, reason: Option<&'a str>) -> NewBotInteraction<'a> {
        NewBotInteraction {
            customer_phone: "+5511999990000",
            customer_name: Some("Maria"),
            user_message: "oi",
            bot_response: "Olá Maria!",
            responder_tier: tier,
            escalated,
            escalation_reason: reason,
        }
    }

    #[tokio::test]
    async fn counts_track_recorded_turns() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let pool = db.pool();

        for _ in 0..3 {
            record(pool, &interaction(false, "fallback", None)).await.unwrap();
        }

        assert_eq!(count_today(pool, "+5511999990000").await.unwrap(), 3);
        assert_eq!(count_last_hour(pool, "+5511999990000").await.unwrap(), 3);
        assert_eq!(count_today(pool, "+5522222222222").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn analytics_aggregates_by_tier_and_reason() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let pool = db.pool();

        record(pool, &interaction(false, "llm", None)).await.unwrap();
        record(pool, &interaction(false, "fallback", None)).await.unwrap();
        record(pool, &interaction(true, "escalation", Some("user_requested")))
            .await
            .unwrap();

        let summary = analytics(pool).await.unwrap();
        assert_eq!(summary.total_interactions, 3);
        assert_eq!(summary.escalated_interactions, 1);
        assert!((summary.success_rate - 66.666).abs() < 0.1);
        assert_eq!(summary.last_24h, 3);
        assert!(summary
            .by_reason
            .iter()
            .any(|(reason, count)| reason == "user_requested" && *count == 1));
    }

    #[tokio::test]
    async fn empty_analytics_has_zero_rate() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let summary = analytics(db.pool()).await.unwrap();
        assert_eq!(summary.total_interactions, 0);
        assert_eq!(summary.success_rate, 0.0);
    }
}
