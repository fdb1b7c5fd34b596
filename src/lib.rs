//! # Chess Sessions Library
//!
//! This crate coordinates timed two-player chess games:
//! - Per-side clocks with increment and pausable one-second ticks
//! - Draw and rematch offers that expire after a fixed window
//! - A session state machine that publishes events to subscribers
//! - A registry handing out session ids
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Game entities, value objects and engine traits
//! - **Application Layer**: Session core, game service and DTOs
//! - **Infrastructure Layer**: Rules engine, move source and metrics
//!
//! ## Module Structure
//!
//! ```text
//! chess_sessions/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, RulesEngine and MoveSource
//! +-- application/    Sessions, GameService and DTOs
//! +-- infrastructure/ shakmaty adapters and Prometheus metrics
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Sessions and services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Shared utilities
pub mod shared;

// Application startup
pub mod startup;

// Telemetry and observability
pub mod telemetry;
