//! Application Startup
//!
//! Wires the registry, rules engine, move source and game service together
//! and runs the housekeeping loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::application::services::GameService;
use crate::application::session::SessionRegistry;
use crate::config::Settings;
use crate::domain::services::{EngineFactory, MoveSource, RulesEngine};
use crate::infrastructure::engine::{LocalMoveSource, ShakmatyEngine};
use crate::infrastructure::metrics;

/// Application instance
pub struct Application {
    games: Arc<GameService>,
    settings: Arc<Settings>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let registry = Arc::new(SessionRegistry::new());

        let engines: EngineFactory =
            Arc::new(|| Box::new(ShakmatyEngine::new()) as Box<dyn RulesEngine>);

        let move_source = if settings.ai.enabled {
            tracing::info!("AI opponents enabled");
            Some(Arc::new(LocalMoveSource::new()) as Arc<dyn MoveSource>)
        } else {
            tracing::info!("AI opponents disabled");
            None
        };

        let games = Arc::new(GameService::new(registry, engines, move_source, &settings));

        // Force metric registration before the first game
        let _ = metrics::gather_metrics();

        Ok(Self {
            games,
            settings: Arc::new(settings),
        })
    }

    /// Shared game service
    pub fn games(&self) -> Arc<GameService> {
        Arc::clone(&self.games)
    }

    /// Run until Ctrl-C, sweeping finished sessions on an interval
    pub async fn run_until_stopped(self) -> Result<()> {
        let sessions = &self.settings.sessions;
        let retention = chrono::Duration::seconds(
            i64::try_from(sessions.finished_retention_secs).unwrap_or(i64::MAX),
        );
        let mut sweep = tokio::time::interval(Duration::from_secs(sessions.sweep_interval_secs));

        loop {
            tokio::select! {
                _ = sweep.tick() => {
                    self.games.sweep_finished(retention);
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    tracing::info!(
                        sessions = self.games.registry().len(),
                        "Shutdown signal received"
                    );
                    break;
                }
            }
        }

        Ok(())
    }
}
