//! Application Layer
//!
//! Contains the session core, orchestration services and data transfer
//! objects (DTOs). This layer drives the domain types and publishes the
//! events callers subscribe to.

pub mod dto;
pub mod services;
pub mod session;
