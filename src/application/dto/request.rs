//! Request DTOs
//!
//! Data structures for inbound game requests.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::{OpponentType, SideChoice};
use crate::domain::value_objects::{ChessMove, MoveKind, MoveParseError, PromotionPiece};

/// Start game request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartGameRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    pub opponent_type: OpponentType,

    #[serde(default)]
    #[validate(length(min = 2, max = 32, message = "Opponent name must be 2-32 characters"))]
    pub opponent_name: Option<String>,

    #[serde(default)]
    pub side: SideChoice,

    #[serde(default)]
    pub is_visible: bool,

    pub duration_secs: u32,

    #[serde(default)]
    pub increment_secs: u32,
}

/// Make move request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MakeMoveDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    pub from_square: String,

    pub to_square: String,

    #[serde(default)]
    pub kind: MoveKind,

    #[serde(default)]
    pub promotion: Option<PromotionPiece>,
}

impl MakeMoveDto {
    pub fn new(username: impl Into<String>, from_square: &str, to_square: &str) -> Self {
        Self {
            username: username.into(),
            from_square: from_square.to_string(),
            to_square: to_square.to_string(),
            kind: MoveKind::Normal,
            promotion: None,
        }
    }

    pub fn with_kind(mut self, kind: MoveKind, promotion: Option<PromotionPiece>) -> Self {
        self.kind = kind;
        self.promotion = promotion;
        self
    }
}

impl TryFrom<&MakeMoveDto> for ChessMove {
    type Error = MoveParseError;

    fn try_from(dto: &MakeMoveDto) -> Result<Self, Self::Error> {
        ChessMove::parse(&dto.from_square, &dto.to_square, dto.kind, dto.promotion)
    }
}

/// Game room listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameRoomSearch {
    /// Only rooms that can be spectated
    #[serde(default)]
    pub spectateable: bool,

    /// Only rooms the requester can join
    #[serde(default)]
    pub joinable: bool,

    #[serde(default)]
    pub requester: String,
}
