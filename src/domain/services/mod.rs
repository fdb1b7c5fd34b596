//! # Domain Services
//!
//! Contracts the session core relies on but does not implement.
//!
//! ## Services
//!
//! - **RulesEngine**: move legality and position state
//! - **MoveSource**: next-move provider for AI seats

mod move_source;
mod rules_engine;

pub use move_source::*;
pub use rules_engine::*;
