//! Game phase, outcome and the record of a finished game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game_room::OpponentType;
use crate::domain::value_objects::Side;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for players to join
    Created,
    /// Moves are accepted and clocks may run
    Active,
    /// Terminal
    Finished,
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameOutcome {
    /// Outcome in which `side` wins.
    pub fn win_for(side: Side) -> Self {
        match side {
            Side::White => Self::WhiteWins,
            Side::Black => Self::BlackWins,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::WhiteWins => Some(Side::White),
            Self::BlackWins => Some(Side::Black),
            Self::Draw => None,
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndType {
    Checkmate,
    Stalemate,
    TimeIsUp,
    Resignation,
    DrawAgreement,
}

impl GameEndType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::TimeIsUp => "time_is_up",
            Self::Resignation => "resignation",
            Self::DrawAgreement => "draw_agreement",
        }
    }
}

impl std::fmt::Display for GameEndType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of a finished game, published once at finalization for whoever
/// persists game history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub creator: String,
    pub player_white: Option<String>,
    pub player_black: Option<String>,
    pub opponent: OpponentType,
    pub visible: bool,
    pub duration_secs: u64,
    pub increment_secs: u64,
    pub outcome: GameOutcome,
    pub end: GameEndType,
    pub final_fen: String,
    pub finished_at: DateTime<Utc>,
}
