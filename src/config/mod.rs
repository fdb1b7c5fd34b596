//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chess_sessions::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Events buffered per session: {}", settings.sessions.event_buffer);
//! ```

mod settings;

pub use settings::*;
