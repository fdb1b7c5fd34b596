//! Response DTOs
//!
//! Data structures returned to callers.

use serde::Serialize;

use crate::application::session::SessionId;
use crate::domain::entities::OpponentType;
use crate::domain::value_objects::Side;

/// Start game response
#[derive(Debug, Clone, Serialize)]
pub struct StartGameResponse {
    pub session_id: SessionId,
    pub opponent: String,
    pub fen: String,
    pub is_white: bool,
}

/// Snapshot of a running game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStateDto {
    pub fen: String,
    pub white_time_left_ms: f64,
    pub black_time_left_ms: f64,
    pub username_white: String,
    pub username_black: String,
    pub side_to_move: Side,
}

/// Lobby listing entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRoomDto {
    pub session_id: SessionId,
    pub creator: String,
    pub opponent: OpponentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_white: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_black: Option<String>,
    pub duration_secs: u64,
    pub increment_secs: u64,
}
