//! AI opponent identifiers and their skill profiles.
//!
//! AI players occupy a seat under a reserved name `StockfishAi1` ..
//! `StockfishAi8`; the digit selects the profile handed to the move source.

use serde::{Deserialize, Serialize};

/// Prefix shared by every AI player name.
pub const AI_PREFIX: &str = "StockfishAi";

/// Skill profile for an AI opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiLevel {
    /// Level number, 1..=8
    pub level: u8,
    /// Engine skill setting
    pub skill: u32,
    /// Search depth
    pub depth: u32,
    /// Thinking time in milliseconds
    pub time_ms: u32,
}

const LEVELS: [(u32, u32, u32); 8] = [
    (3, 1, 50),
    (6, 2, 100),
    (9, 3, 150),
    (11, 4, 200),
    (14, 6, 250),
    (17, 8, 300),
    (20, 10, 350),
    (20, 12, 400),
];

impl AiLevel {
    /// Profile for a level number, `None` outside 1..=8.
    pub fn from_level(level: u8) -> Option<Self> {
        let (skill, depth, time_ms) = *LEVELS.get(usize::from(level).checked_sub(1)?)?;
        Some(Self {
            level,
            skill,
            depth,
            time_ms,
        })
    }

    /// Profile for an AI player name such as `StockfishAi3`.
    pub fn from_player(name: &str) -> Option<Self> {
        let digits = name.strip_prefix(AI_PREFIX)?;
        if digits.len() != 1 {
            return None;
        }
        let level = digits.parse::<u8>().ok()?;
        Self::from_level(level)
    }

    /// Reserved player name for this level.
    pub fn player_name(&self) -> String {
        format!("{}{}", AI_PREFIX, self.level)
    }
}

/// Whether a player name denotes an AI opponent.
pub fn is_ai(name: &str) -> bool {
    AiLevel::from_player(name).is_some()
}
