//! # Value Objects
//!
//! Immutable domain value types: sides, squares, moves, time controls and
//! AI skill profiles.

pub mod ai_level;
pub mod chess_move;
pub mod side;
pub mod square;
pub mod time_control;

pub use ai_level::{is_ai, AiLevel, AI_PREFIX};
pub use chess_move::{split_uci, ChessMove, MoveKind, MoveParseError, PromotionPiece, UciParts};
pub use side::Side;
pub use square::Square;
pub use time_control::{display_seconds, TimeControl};
