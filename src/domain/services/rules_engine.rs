//! Chess rules abstraction.
//!
//! Sessions never reason about piece movement themselves; they ask a
//! [`RulesEngine`] whether a move is legal, apply it and read back the
//! resulting position.

use thiserror::Error;

use crate::domain::value_objects::{ChessMove, Side, Square};

/// Errors raised by a rules engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("Position is not playable: {0}")]
    InvalidPosition(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

/// A chess rules engine holding one game position.
///
/// Castling moves are expressed as king square to rook square, e.g. `e1h1`
/// for white kingside.
pub trait RulesEngine: Send {
    /// Reset to the given FEN, or the standard start position.
    fn new_game(&mut self, fen: Option<&str>) -> Result<(), EngineError>;

    /// Whether `mv` is legal in the current position.
    fn is_legal(&self, mv: &ChessMove) -> bool;

    /// Play `mv`. Fails without changing the position if the move is illegal.
    fn apply_move(&mut self, mv: &ChessMove) -> Result<(), EngineError>;

    fn side_to_move(&self) -> Side;

    fn is_checkmate(&self) -> bool;

    fn has_no_legal_moves(&self) -> bool;

    fn in_check(&self) -> bool;

    /// Current position as FEN.
    fn fen(&self) -> String;

    /// Square a pawn may capture onto en passant, if any.
    fn en_passant_square(&self) -> Option<Square>;
}

/// Builds a fresh engine per session.
pub type EngineFactory = std::sync::Arc<dyn Fn() -> Box<dyn RulesEngine> + Send + Sync>;
