//! Rules engine and move source adapters.

mod local_move_source;
mod shakmaty_engine;

pub use local_move_source::LocalMoveSource;
pub use shakmaty_engine::ShakmatyEngine;
