//! Acknowledgement codes returned by session operations.

use serde::{Deserialize, Serialize};

/// Outcome of a client-triggered session operation. Every operation resolves
/// to exactly one of these; none of them is a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AckType {
    Success,
    NotFound,
    InvalidMove,
    GameHasFinished,
    NotUserTurn,
    DrawNotOffered,
    DrawOfferDeclined,
    DrawOfferExpired,
    RematchNotOffered,
    RematchOfferDeclined,
    RematchOfferExpired,
    /// Move text could not be parsed at all
    MalformedMove,
    /// An offer of the same kind is still awaiting a response
    OfferPending,
    NotJoinable,
    NotSpectateable,
}

impl AckType {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidMove => "INVALID_MOVE",
            Self::GameHasFinished => "GAME_HAS_FINISHED",
            Self::NotUserTurn => "NOT_USER_TURN",
            Self::DrawNotOffered => "DRAW_NOT_OFFERED",
            Self::DrawOfferDeclined => "DRAW_OFFER_DECLINED",
            Self::DrawOfferExpired => "DRAW_OFFER_EXPIRED",
            Self::RematchNotOffered => "REMATCH_NOT_OFFERED",
            Self::RematchOfferDeclined => "REMATCH_OFFER_DECLINED",
            Self::RematchOfferExpired => "REMATCH_OFFER_EXPIRED",
            Self::MalformedMove => "MALFORMED_MOVE",
            Self::OfferPending => "OFFER_PENDING",
            Self::NotJoinable => "NOT_JOINABLE",
            Self::NotSpectateable => "NOT_SPECTATEABLE",
        }
    }
}

impl std::fmt::Display for AckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
