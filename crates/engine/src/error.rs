//! Error types for engine operations.

use thiserror::Error;

/// Errors that can occur while coordinating a turn.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ledger/database failure.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Message sending failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}
