//! Data Transfer Objects
//!
//! DTOs for request/response serialization.

pub mod request;
pub mod response;

pub use request::{GameRoomSearch, MakeMoveDto, StartGameRequest};
pub use response::{GameRoomDto, GameStateDto, StartGameResponse};
