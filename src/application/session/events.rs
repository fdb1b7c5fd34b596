//! Session events
//!
//! Outgoing stream of a session. Every subscriber receives every event; the
//! `target` of a [`RoutedEvent`] names the participant an event is addressed
//! to when it is not meant for the whole room.

use serde::{Deserialize, Serialize};

use super::negotiation::NegotiationKind;
use super::SessionId;
use crate::domain::entities::{GameEndType, GameRecord};
use crate::domain::value_objects::Side;

/// Session event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "d")]
pub enum SessionEvent {
    // Lifecycle
    #[serde(rename = "PLAYER_JOINED")]
    PlayerJoined(PlayerJoinedEvent),
    #[serde(rename = "NEW_POSITION")]
    NewPosition(NewPositionEvent),
    #[serde(rename = "TIME_UPDATE")]
    TimeUpdate(TimeUpdateEvent),
    #[serde(rename = "RESIGNATION")]
    Resignation(ResignationEvent),
    #[serde(rename = "REACHED_END_OF_GAME")]
    ReachedEndOfGame(ReachedEndOfGameEvent),
    #[serde(rename = "GAME_FINISHED")]
    GameFinished(GameRecord),

    // Draw negotiation
    #[serde(rename = "DRAW_OFFER")]
    DrawOffer(OfferEvent),
    #[serde(rename = "DRAW_OFFER_TIMEOUT")]
    DrawOfferTimeout(OfferEvent),
    #[serde(rename = "DRAW_OFFER_ACCEPTED")]
    DrawOfferAccepted(OfferEvent),

    // Rematch negotiation
    #[serde(rename = "REMATCH_OFFER")]
    RematchOffer(OfferEvent),
    #[serde(rename = "REMATCH_OFFER_TIMEOUT")]
    RematchOfferTimeout(OfferEvent),
    #[serde(rename = "REMATCH_OFFER_ACCEPTED")]
    RematchOfferAccepted(OfferEvent),
    #[serde(rename = "REMATCH_INVITATION")]
    RematchInvitation(RematchInvitationEvent),
}

impl SessionEvent {
    /// Get the event name for dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::PlayerJoined(_) => "PLAYER_JOINED",
            SessionEvent::NewPosition(_) => "NEW_POSITION",
            SessionEvent::TimeUpdate(_) => "TIME_UPDATE",
            SessionEvent::Resignation(_) => "RESIGNATION",
            SessionEvent::ReachedEndOfGame(_) => "REACHED_END_OF_GAME",
            SessionEvent::GameFinished(_) => "GAME_FINISHED",
            SessionEvent::DrawOffer(_) => "DRAW_OFFER",
            SessionEvent::DrawOfferTimeout(_) => "DRAW_OFFER_TIMEOUT",
            SessionEvent::DrawOfferAccepted(_) => "DRAW_OFFER_ACCEPTED",
            SessionEvent::RematchOffer(_) => "REMATCH_OFFER",
            SessionEvent::RematchOfferTimeout(_) => "REMATCH_OFFER_TIMEOUT",
            SessionEvent::RematchOfferAccepted(_) => "REMATCH_OFFER_ACCEPTED",
            SessionEvent::RematchInvitation(_) => "REMATCH_INVITATION",
        }
    }

    /// Serialize the event payload to JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SessionEvent::PlayerJoined(e) => serde_json::to_value(e).unwrap_or_default(),
            SessionEvent::NewPosition(e) => serde_json::to_value(e).unwrap_or_default(),
            SessionEvent::TimeUpdate(e) => serde_json::to_value(e).unwrap_or_default(),
            SessionEvent::Resignation(e) => serde_json::to_value(e).unwrap_or_default(),
            SessionEvent::ReachedEndOfGame(e) => serde_json::to_value(e).unwrap_or_default(),
            SessionEvent::GameFinished(e) => serde_json::to_value(e).unwrap_or_default(),
            SessionEvent::DrawOffer(e)
            | SessionEvent::DrawOfferTimeout(e)
            | SessionEvent::DrawOfferAccepted(e)
            | SessionEvent::RematchOffer(e)
            | SessionEvent::RematchOfferTimeout(e)
            | SessionEvent::RematchOfferAccepted(e) => serde_json::to_value(e).unwrap_or_default(),
            SessionEvent::RematchInvitation(e) => serde_json::to_value(e).unwrap_or_default(),
        }
    }

    /// Offer of `kind` made by `offered_by`.
    pub fn offer(kind: NegotiationKind, offered_by: Side) -> Self {
        let payload = OfferEvent { offered_by };
        match kind {
            NegotiationKind::Draw => SessionEvent::DrawOffer(payload),
            NegotiationKind::Rematch => SessionEvent::RematchOffer(payload),
        }
    }

    /// Offer of `kind` by `offered_by` expired unanswered.
    pub fn offer_timeout(kind: NegotiationKind, offered_by: Side) -> Self {
        let payload = OfferEvent { offered_by };
        match kind {
            NegotiationKind::Draw => SessionEvent::DrawOfferTimeout(payload),
            NegotiationKind::Rematch => SessionEvent::RematchOfferTimeout(payload),
        }
    }

    /// Offer of `kind` by `offered_by` was accepted.
    pub fn offer_accepted(kind: NegotiationKind, offered_by: Side) -> Self {
        let payload = OfferEvent { offered_by };
        match kind {
            NegotiationKind::Draw => SessionEvent::DrawOfferAccepted(payload),
            NegotiationKind::Rematch => SessionEvent::RematchOfferAccepted(payload),
        }
    }
}

// Event payload structs

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoinedEvent {
    pub fen: String,
    pub time_left_ms: f64,
    pub username_white: String,
    pub username_black: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPositionEvent {
    pub fen: String,
    pub side_to_move: Side,
    /// Clock of the side now to move
    pub time_left_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeUpdateEvent {
    /// Side whose clock ticked, or the flagged side when `game_end` is set
    pub side: Side,
    pub time_left_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_end: Option<GameEndType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResignationEvent {
    pub resigned: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachedEndOfGameEvent {
    pub fen: String,
    pub end: GameEndType,
    pub side_to_move: Side,
    pub time_left_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferEvent {
    pub offered_by: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RematchInvitationEvent {
    pub new_session_id: SessionId,
}

/// Event with routing information
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEvent {
    pub session_id: SessionId,
    /// Addressed participant (None = everyone in the room)
    pub target: Option<String>,
    pub event: SessionEvent,
}

/// Remaining time as published to clients; never negative.
pub(crate) fn published_ms(remaining_ms: f64) -> f64 {
    remaining_ms.max(0.0)
}
