//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **GameService**: Game creation, lobby listing, AI replies and rematches

pub mod game_service;

pub use game_service::GameService;
