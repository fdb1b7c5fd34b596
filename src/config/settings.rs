//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Time control limits for new games
    pub game: GameSettings,

    /// Session lifecycle configuration
    pub sessions: SessionSettings,

    /// AI opponent configuration
    pub ai: AiSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Limits applied to requested time controls.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    /// Shortest allowed base time in seconds
    pub min_duration_secs: u32,

    /// Longest allowed base time in seconds
    pub max_duration_secs: u32,

    /// Largest allowed increment in seconds
    pub max_increment_secs: u32,
}

/// Session lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Capacity of each session's event channel
    pub event_buffer: usize,

    /// How long a finished session stays available for rematch offers
    pub finished_retention_secs: u64,

    /// How often finished sessions are swept
    pub sweep_interval_secs: u64,
}

/// AI opponent configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    /// Drive AI seats with the built-in move source
    pub enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            min_duration_secs: 30,
            max_duration_secs: 86_400,
            max_increment_secs: 60,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            event_buffer: 256,
            finished_retention_secs: 300,
            sweep_interval_secs: 60,
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game: GameSettings::default(),
            sessions: SessionSettings::default(),
            ai: AiSettings::default(),
            environment: "development".into(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the loaded values are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());
        let defaults = Settings::default();

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("game.min_duration_secs", defaults.game.min_duration_secs)?
            .set_default("game.max_duration_secs", defaults.game.max_duration_secs)?
            .set_default("game.max_increment_secs", defaults.game.max_increment_secs)?
            .set_default("sessions.event_buffer", defaults.sessions.event_buffer as u64)?
            .set_default(
                "sessions.finished_retention_secs",
                defaults.sessions.finished_retention_secs,
            )?
            .set_default("sessions.sweep_interval_secs", defaults.sessions.sweep_interval_secs)?
            .set_default("ai.enabled", defaults.ai.enabled)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__GAME__MAX_INCREMENT_SECS=30 -> game.max_increment_secs = 30
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    /// Reject inconsistent values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.min_duration_secs > self.game.max_duration_secs {
            return Err(ConfigError::Message(format!(
                "game.min_duration_secs ({}) exceeds game.max_duration_secs ({})",
                self.game.min_duration_secs, self.game.max_duration_secs
            )));
        }
        if self.sessions.event_buffer == 0 {
            return Err(ConfigError::Message(
                "sessions.event_buffer must be greater than zero".into(),
            ));
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "sessions.sweep_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
