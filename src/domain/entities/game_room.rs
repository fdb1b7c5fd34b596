//! Game room configuration and seating.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{is_ai, Side, TimeControl};

/// Who the creator plays against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpponentType {
    /// A named user invited by the creator
    #[default]
    Friend,
    /// Whoever joins first from the lobby
    Random,
    /// A built-in AI opponent
    Ai,
}

impl OpponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::Random => "random",
            Self::Ai => "ai",
        }
    }
}

impl std::fmt::Display for OpponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Side requested by the creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SideChoice {
    White,
    Black,
    #[default]
    Random,
}

/// Immutable match configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Username of the player who created the room
    pub creator: String,

    /// Opponent kind
    pub opponent: OpponentType,

    /// Side requested at creation, reused for rematches
    pub side_choice: SideChoice,

    /// Whether the running game may be spectated
    pub visible: bool,

    /// Clock settings
    pub time_control: TimeControl,
}

/// The two seats of a game. A seat is empty until someone takes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub white: Option<String>,
    pub black: Option<String>,
}

impl Players {
    pub fn new(white: Option<String>, black: Option<String>) -> Self {
        Self { white, black }
    }

    /// Username seated on `side`.
    pub fn username(&self, side: Side) -> Option<&str> {
        match side {
            Side::White => self.white.as_deref(),
            Side::Black => self.black.as_deref(),
        }
    }

    /// Side a username is seated on.
    pub fn side_of(&self, username: &str) -> Option<Side> {
        if self.white.as_deref() == Some(username) {
            Some(Side::White)
        } else if self.black.as_deref() == Some(username) {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn is_participant(&self, username: &str) -> bool {
        self.side_of(username).is_some()
    }

    /// Seat a user in the first empty seat, white first. Returns the side
    /// taken, or `None` if both seats are occupied.
    pub fn seat(&mut self, username: &str) -> Option<Side> {
        if self.white.is_none() {
            self.white = Some(username.to_string());
            Some(Side::White)
        } else if self.black.is_none() {
            self.black = Some(username.to_string());
            Some(Side::Black)
        } else {
            None
        }
    }

    /// The AI seat, if any.
    pub fn ai_side(&self) -> Option<Side> {
        [Side::White, Side::Black]
            .into_iter()
            .find(|side| self.username(*side).is_some_and(is_ai))
    }
}
