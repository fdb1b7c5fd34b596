//! Move representation exchanged between sessions, clients and the rules engine.
//!
//! A move is a pair of squares plus an explicit kind tag and, for promotions,
//! the promoted piece. Castling is handed to the rules engine as king square
//! to rook square; clients may also send the king's destination square, which
//! [`ChessMove::normalized`] rewrites.

use serde::{Deserialize, Serialize};

use super::square::Square;

/// Errors raised for malformed move input, as opposed to well-formed but
/// illegal moves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("Invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("UCI move must have at least 4 characters: {0:?}")]
    TooShort(String),

    #[error("Unknown promotion piece: {0:?}")]
    UnknownPromotion(char),
}

/// Move kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    #[default]
    Normal,
    Castling,
    EnPassant,
    Promotion,
}

/// Piece a pawn promotes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    /// Parse the UCI suffix letter (`q`, `r`, `b`, `n`).
    pub fn from_uci_char(c: char) -> Result<Self, MoveParseError> {
        match c.to_ascii_lowercase() {
            'q' => Ok(Self::Queen),
            'r' => Ok(Self::Rook),
            'b' => Ok(Self::Bishop),
            'n' => Ok(Self::Knight),
            other => Err(MoveParseError::UnknownPromotion(other)),
        }
    }

    pub fn uci_char(&self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        }
    }
}

/// A move in squares-plus-tag form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    #[serde(default)]
    pub kind: MoveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}

impl ChessMove {
    pub fn normal(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            kind: MoveKind::Normal,
            promotion: None,
        }
    }

    pub fn castling(king: Square, target: Square) -> Self {
        Self {
            from: king,
            to: target,
            kind: MoveKind::Castling,
            promotion: None,
        }
    }

    pub fn en_passant(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            kind: MoveKind::EnPassant,
            promotion: None,
        }
    }

    pub fn promotion(from: Square, to: Square, piece: PromotionPiece) -> Self {
        Self {
            from,
            to,
            kind: MoveKind::Promotion,
            promotion: Some(piece),
        }
    }

    /// Parse square names and attach a kind. A promotion without a piece
    /// promotes to a queen.
    pub fn parse(
        from: &str,
        to: &str,
        kind: MoveKind,
        promotion: Option<PromotionPiece>,
    ) -> Result<Self, MoveParseError> {
        let from: Square = from.parse()?;
        let to: Square = to.parse()?;

        Ok(match kind {
            MoveKind::Promotion => Self::promotion(from, to, promotion.unwrap_or(PromotionPiece::Queen)),
            other => Self {
                from,
                to,
                kind: other,
                promotion: None,
            },
        })
    }

    /// Rewrite castling given as king destination (`e1g1`) into the king to
    /// rook form (`e1h1`). Other moves are returned unchanged.
    pub fn normalized(self) -> Self {
        if self.kind != MoveKind::Castling || self.from.rank() != self.to.rank() {
            return self;
        }

        let rook_file = match self.to.file() {
            6 => 7,
            2 => 0,
            _ => return self,
        };

        match self.to.with_file(rook_file) {
            Some(to) => Self { to, ..self },
            None => self,
        }
    }

    /// UCI text of this move as sent by clients (castling keeps whatever
    /// target square the move carries).
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(piece) => format!("{}{}{}", self.from, self.to, piece.uci_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

/// Squares and optional promotion piece of a UCI string such as `e7e8q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UciParts {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PromotionPiece>,
}

/// Split a UCI move string into its parts. Kind detection needs board state
/// and is done by the session.
pub fn split_uci(uci: &str) -> Result<UciParts, MoveParseError> {
    let uci = uci.trim();
    if uci.len() < 4 || !uci.is_ascii() {
        return Err(MoveParseError::TooShort(uci.to_string()));
    }

    let from: Square = uci[..2].parse()?;
    let to: Square = uci[2..4].parse()?;
    let promotion = uci[4..]
        .chars()
        .next()
        .map(PromotionPiece::from_uci_char)
        .transpose()?;

    Ok(UciParts { from, to, promotion })
}
