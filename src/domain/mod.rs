//! # Domain Layer
//!
//! The domain layer contains the core vocabulary of a chess session.
//! It is independent of any runtime or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Game configuration, seating, phase and outcome
//! - **value_objects**: Immutable value types (Side, Square, ChessMove, TimeControl, AiLevel)
//! - **services**: Traits for the rules engine and AI move source
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure layers
//! - Chess rules live behind the `RulesEngine` trait

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
