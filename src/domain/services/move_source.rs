//! Source of moves for AI-controlled seats.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::value_objects::AiLevel;

#[derive(Debug, Error)]
pub enum MoveSourceError {
    #[error("Position has no legal moves")]
    NoMoves,

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Move source unavailable: {0}")]
    Unavailable(String),
}

/// Produces the next move for an AI player as a UCI string (`e2e4`,
/// `e7e8q`, `e1g1`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MoveSource: Send + Sync {
    async fn best_move(&self, fen: &str, level: AiLevel) -> Result<String, MoveSourceError>;
}
