//! Algebraic board squares (`a1`..`h8`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::chess_move::MoveParseError;

/// A board square addressed by zero-based file and rank.
///
/// `a1` is `(0, 0)`, `h8` is `(7, 7)`. Serialized as its algebraic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Build a square from zero-based coordinates, `None` when off the board.
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Same rank, different file.
    pub fn with_file(&self, file: u8) -> Option<Self> {
        Self::new(file, self.rank)
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.rank) as char
    }
}

impl FromStr for Square {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(MoveParseError::InvalidSquare(s.to_string()));
        }

        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');

        Self::new(file, rank).ok_or_else(|| MoveParseError::InvalidSquare(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = MoveParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
