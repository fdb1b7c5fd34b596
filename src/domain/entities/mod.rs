//! # Domain Entities
//!
//! Core domain entities of a chess session.
//!
//! - **GameConfig**: immutable match configuration (creator, opponent kind,
//!   requested side, visibility, time control)
//! - **Players**: the two seats of a game
//! - **Phase / GameOutcome / GameEndType**: lifecycle and result
//! - **GameRecord**: summary of a finished game

mod game_room;
mod outcome;

pub use game_room::{GameConfig, OpponentType, Players, SideChoice};
pub use outcome::{GameEndType, GameOutcome, GameRecord, Phase};
