//! Common Test Utilities
//!
//! Shared helpers and fixtures for game scenarios.

use std::sync::Arc;

use tokio::sync::broadcast;

use chess_sessions::application::dto::StartGameRequest;
use chess_sessions::application::services::GameService;
use chess_sessions::application::session::{RoutedEvent, Session, SessionEvent, SessionRegistry};
use chess_sessions::config::Settings;
use chess_sessions::domain::entities::{GameConfig, OpponentType, Players, SideChoice};
use chess_sessions::domain::services::{EngineFactory, MoveSource, RulesEngine};
use chess_sessions::domain::value_objects::{ChessMove, Square, TimeControl};
use chess_sessions::infrastructure::engine::ShakmatyEngine;

pub const WHITE: &str = "Bob";
pub const BLACK: &str = "Jim";

pub fn engines() -> EngineFactory {
    Arc::new(|| Box::new(ShakmatyEngine::new()) as Box<dyn RulesEngine>)
}

/// Game service over a fresh registry
pub fn game_service(move_source: Option<Arc<dyn MoveSource>>) -> Arc<GameService> {
    Arc::new(GameService::new(
        Arc::new(SessionRegistry::new()),
        engines(),
        move_source,
        &Settings::default(),
    ))
}

/// Friend game request: Bob (white) invites Jim, 60 s + 5 s
pub fn friend_request() -> StartGameRequest {
    StartGameRequest {
        username: WHITE.into(),
        opponent_type: OpponentType::Friend,
        opponent_name: Some(BLACK.into()),
        side: SideChoice::White,
        is_visible: true,
        duration_secs: 60,
        increment_secs: 5,
    }
}

/// Bob vs Jim, both seated and joined, no moves played
pub async fn started_game(service: &GameService) -> Arc<Session> {
    let response = service
        .start_game(friend_request())
        .await
        .expect("friend game should start");

    service.join_game(response.session_id, WHITE);
    service.join_game(response.session_id, BLACK);

    service
        .registry()
        .get(response.session_id)
        .expect("session should be registered")
}

/// Active Bob vs Jim session with an arbitrary time control
pub fn session_with(time_control: TimeControl, fen: Option<&str>) -> Arc<Session> {
    let config = GameConfig {
        creator: WHITE.into(),
        opponent: OpponentType::Friend,
        side_choice: SideChoice::White,
        visible: false,
        time_control,
    };
    let players = Players::new(Some(WHITE.into()), Some(BLACK.into()));
    let session = Session::new(config, players, Box::new(ShakmatyEngine::new()), fen, 64)
        .expect("position should be valid");

    SessionRegistry::new().add(Arc::clone(&session));
    session.initialize();
    session.player_joined();
    session
}

pub fn sq(name: &str) -> Square {
    name.parse().expect("valid square")
}

pub fn mv(from: &str, to: &str) -> ChessMove {
    ChessMove::normal(sq(from), sq(to))
}

/// Next event on the stream, skipping lagged notices
pub async fn next_event(events: &mut broadcast::Receiver<RoutedEvent>) -> SessionEvent {
    loop {
        match events.recv().await {
            Ok(routed) => return routed.event,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => panic!("event stream closed"),
        }
    }
}
