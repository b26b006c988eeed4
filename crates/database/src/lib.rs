//! SQLite conversation ledger for Atende.
//!
//! This crate provides async database operations for conversations, messages,
//! bot interactions and agents using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{conversation, models::ConversationStatus, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:atende.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Open a conversation for a customer
//!     let conv = conversation::create(
//!         db.pool(),
//!         "+5511999990000",
//!         Some("Maria"),
//!         "system",
//!         ConversationStatus::Pending,
//!     )
//!     .await?;
//!     println!("conversation {}", conv.id);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod bot_interaction;
pub mod conversation;
pub mod error;
pub mod message;
pub mod models;

pub use error::{DatabaseError, Result};
pub use models::{
    Agent, BotInteraction, Conversation, ConversationStatus, Message, MessageKind,
    NewBotInteraction,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

// Re-exported so dependents can take pools in their signatures without
// pinning their own sqlx version.
pub use sqlx::SqlitePool;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent webhook processing.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist, or
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationStatus, MessageKind};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn conversation_round_trip() {
        let db = test_db().await;

        let conv = conversation::create(
            db.pool(),
            "+5511999990000",
            Some("Maria"),
            "system",
            ConversationStatus::Pending,
        )
        .await
        .unwrap();

        let fetched = conversation::get(db.pool(), conv.id).await.unwrap();
        assert_eq!(fetched.customer_number, "+5511999990000");
        assert_eq!(fetched.status, ConversationStatus::Pending);
        assert_eq!(fetched.display_name.as_deref(), Some("Maria"));

        message::append(
            db.pool(),
            conv.id,
            MessageKind::Customer,
            "Olá",
            None,
        )
        .await
        .unwrap();
        assert_eq!(message::count(db.pool(), conv.id).await.unwrap(), 1);
    }
}
