//! `RulesEngine` backed by shakmaty.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Rank, Role};

use crate::domain::services::{EngineError, RulesEngine};
use crate::domain::value_objects::{ChessMove, MoveKind, PromotionPiece, Side, Square};

/// Standard chess rules over a shakmaty position.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyEngine {
    position: Chess,
}

impl ShakmatyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine set up on `fen`.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        Ok(Self {
            position: parse_position(fen)?,
        })
    }

    fn find_legal(&self, mv: &ChessMove) -> Option<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .find(|candidate| matches_move(mv, candidate))
    }
}

impl RulesEngine for ShakmatyEngine {
    fn new_game(&mut self, fen: Option<&str>) -> Result<(), EngineError> {
        self.position = match fen {
            Some(fen) => parse_position(fen)?,
            None => Chess::default(),
        };
        Ok(())
    }

    fn is_legal(&self, mv: &ChessMove) -> bool {
        self.find_legal(mv).is_some()
    }

    fn apply_move(&mut self, mv: &ChessMove) -> Result<(), EngineError> {
        let legal = self
            .find_legal(mv)
            .ok_or_else(|| EngineError::IllegalMove(mv.to_uci()))?;
        self.position.play_unchecked(&legal);
        Ok(())
    }

    fn side_to_move(&self) -> Side {
        side_of(self.position.turn())
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn has_no_legal_moves(&self) -> bool {
        self.position.legal_moves().is_empty()
    }

    fn in_check(&self) -> bool {
        self.position.is_check()
    }

    fn fen(&self) -> String {
        Fen::from_setup(self.position.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    fn en_passant_square(&self) -> Option<Square> {
        self.position
            .ep_square(EnPassantMode::Legal)
            .and_then(from_engine_square)
    }
}

pub(crate) fn parse_position(fen: &str) -> Result<Chess, EngineError> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| EngineError::InvalidFen(format!("{fen}: {e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| EngineError::InvalidPosition(e.to_string()))
}

pub(crate) fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn to_engine_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::from_coords(
        File::new(u32::from(square.file())),
        Rank::new(u32::from(square.rank())),
    )
}

fn from_engine_square(square: shakmaty::Square) -> Option<Square> {
    Square::new(u8::from(square.file()), u8::from(square.rank()))
}

fn promotion_role(piece: PromotionPiece) -> Role {
    match piece {
        PromotionPiece::Queen => Role::Queen,
        PromotionPiece::Rook => Role::Rook,
        PromotionPiece::Bishop => Role::Bishop,
        PromotionPiece::Knight => Role::Knight,
    }
}

/// Whether the squares-plus-tag move denotes the engine move. The kind tag
/// must agree: an en passant capture sent as a normal move does not match.
fn matches_move(mv: &ChessMove, candidate: &Move) -> bool {
    let from = to_engine_square(mv.from);
    let to = to_engine_square(mv.to);

    match (mv.kind, candidate) {
        (MoveKind::Normal, Move::Normal {
            from: f,
            to: t,
            promotion: None,
            ..
        }) => *f == from && *t == to,
        (MoveKind::Promotion, Move::Normal {
            from: f,
            to: t,
            promotion: Some(role),
            ..
        }) => {
            *f == from
                && *t == to
                && Some(*role) == mv.promotion.map(promotion_role)
        }
        (MoveKind::Castling, Move::Castle { king, rook }) => *king == from && *rook == to,
        (MoveKind::EnPassant, Move::EnPassant { from: f, to: t }) => *f == from && *t == to,
        _ => false,
    }
}

/// Convert an engine move to UCI text, castling as the king's destination.
pub(crate) fn uci_of(candidate: &Move) -> String {
    match candidate {
        Move::Normal {
            from,
            to,
            promotion,
            ..
        } => match promotion {
            Some(role) => format!("{from}{to}{}", role_char(*role)),
            None => format!("{from}{to}"),
        },
        Move::EnPassant { from, to } => format!("{from}{to}"),
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            let target = shakmaty::Square::from_coords(file, king.rank());
            format!("{king}{target}")
        }
        Move::Put { role, to } => format!("{}@{to}", role_char(*role).to_ascii_uppercase()),
    }
}

fn role_char(role: Role) -> char {
    match role {
        Role::Pawn => 'p',
        Role::Knight => 'n',
        Role::Bishop => 'b',
        Role::Rook => 'r',
        Role::Queen => 'q',
        Role::King => 'k',
    }
}
