//! In-process move source for AI seats.
//!
//! Stands in for an external UCI engine: stronger profiles take a mate in
//! one or the most valuable capture when there is one, otherwise a random
//! legal move is played.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use shakmaty::{Chess, Move, Position, Role};

use super::shakmaty_engine::{parse_position, uci_of};
use crate::domain::services::{MoveSource, MoveSourceError};
use crate::domain::value_objects::AiLevel;

/// Lowest level that looks for tactics instead of moving at random.
const TACTICAL_LEVEL: u8 = 4;

#[derive(Debug, Clone, Default)]
pub struct LocalMoveSource;

impl LocalMoveSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MoveSource for LocalMoveSource {
    async fn best_move(&self, fen: &str, level: AiLevel) -> Result<String, MoveSourceError> {
        let position =
            parse_position(fen).map_err(|e| MoveSourceError::InvalidPosition(e.to_string()))?;
        let chosen = choose_move(&position, level).ok_or(MoveSourceError::NoMoves)?;

        tracing::debug!(level = level.level, mv = %uci_of(&chosen), "Local move chosen");
        Ok(uci_of(&chosen))
    }
}

fn choose_move(position: &Chess, level: AiLevel) -> Option<Move> {
    let moves = position.legal_moves();

    if level.level >= TACTICAL_LEVEL {
        let mate = moves.iter().find(|candidate| {
            let mut after = position.clone();
            after.play_unchecked(candidate);
            after.is_checkmate()
        });
        if let Some(mate) = mate {
            return Some(mate.clone());
        }

        let best_capture = moves
            .iter()
            .filter_map(|candidate| captured(candidate).map(|role| (role_value(role), candidate)))
            .max_by_key(|(value, _)| *value);
        if let Some((_, capture)) = best_capture {
            return Some(capture.clone());
        }
    }

    moves.as_slice().choose(&mut rand::rng()).cloned()
}

fn captured(candidate: &Move) -> Option<Role> {
    match candidate {
        Move::Normal { capture, .. } => *capture,
        Move::EnPassant { .. } => Some(Role::Pawn),
        _ => None,
    }
}

fn role_value(role: Role) -> u8 {
    match role {
        Role::Pawn => 1,
        Role::Knight | Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}
