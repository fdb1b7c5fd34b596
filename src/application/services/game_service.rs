//! Game Service
//!
//! Lobby and orchestration around the session core: validates new games,
//! assigns seats, drives AI opponents and turns accepted rematches into
//! fresh sessions.

use std::sync::Arc;

use tokio::sync::broadcast;
use validator::Validate;

use crate::application::dto::{
    GameRoomDto, GameRoomSearch, GameStateDto, MakeMoveDto, StartGameRequest, StartGameResponse,
};
use crate::application::session::{AckType, RoutedEvent, Session, SessionId, SessionRegistry};
use crate::config::{GameSettings, Settings};
use crate::domain::entities::{GameConfig, OpponentType, Phase, Players, SideChoice};
use crate::domain::services::{EngineFactory, MoveSource};
use crate::domain::value_objects::{is_ai, ChessMove, TimeControl};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;

/// Coordinates sessions held by a [`SessionRegistry`].
pub struct GameService {
    registry: Arc<SessionRegistry>,
    engines: EngineFactory,
    move_source: Option<Arc<dyn MoveSource>>,
    limits: GameSettings,
    event_buffer: usize,
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("sessions", &self.registry.len())
            .field("ai_enabled", &self.move_source.is_some())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl GameService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        engines: EngineFactory,
        move_source: Option<Arc<dyn MoveSource>>,
        settings: &Settings,
    ) -> Self {
        Self {
            registry,
            engines,
            move_source,
            limits: settings.game.clone(),
            event_buffer: settings.sessions.event_buffer,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Create, register and start a new game.
    pub async fn start_game(
        &self,
        request: StartGameRequest,
    ) -> Result<StartGameResponse, AppError> {
        request.validate().map_err(validation_error)?;
        self.check_time_control(&request)?;
        check_opponent(&request)?;

        let config = GameConfig {
            creator: request.username.clone(),
            opponent: request.opponent_type,
            side_choice: request.side,
            visible: request.is_visible,
            time_control: TimeControl::from_secs(request.duration_secs, request.increment_secs),
        };
        let (players, creator_is_white) =
            seat_players(&request.username, request.opponent_name.clone(), request.side);

        let session = self.launch(config, players)?;
        self.drive_ai(&session).await;

        Ok(StartGameResponse {
            session_id: session.id(),
            opponent: request.opponent_name.unwrap_or_default(),
            fen: session.fen(),
            is_white: creator_is_white,
        })
    }

    pub fn join_game(&self, id: SessionId, username: &str) -> AckType {
        match self.registry.get(id) {
            Ok(session) => session.join(username),
            Err(_) => AckType::NotFound,
        }
    }

    pub fn spectate_game(&self, id: SessionId) -> AckType {
        match self.registry.get(id) {
            Ok(session) => session.spectate(),
            Err(_) => AckType::NotFound,
        }
    }

    /// Play a move and let an AI opponent answer.
    pub async fn make_move(&self, id: SessionId, request: MakeMoveDto) -> AckType {
        if let Err(e) = request.validate() {
            tracing::debug!(session_id = id, error = %e, "Rejected move request");
            return AckType::MalformedMove;
        }
        let Ok(session) = self.registry.get(id) else {
            return AckType::NotFound;
        };

        let mv = match ChessMove::try_from(&request) {
            Ok(mv) => mv,
            Err(e) => {
                tracing::debug!(session_id = id, player = %request.username, error = %e, "Malformed move");
                return AckType::MalformedMove;
            }
        };

        let ack = session.make_move(&request.username, &mv);
        if ack.is_success() {
            self.drive_ai(&session).await;
        }
        ack
    }

    pub fn resign(&self, id: SessionId, username: &str) -> AckType {
        match self.registry.get(id) {
            Ok(session) => session.resign(username),
            Err(_) => AckType::NotFound,
        }
    }

    pub async fn offer_draw(&self, id: SessionId, username: &str) -> AckType {
        match self.registry.get(id) {
            Ok(session) => session.offer_draw(username).await,
            Err(_) => AckType::NotFound,
        }
    }

    pub fn respond_to_draw(&self, id: SessionId, username: &str, accept: bool) -> AckType {
        match self.registry.get(id) {
            Ok(session) => session.respond_to_draw(username, accept),
            Err(_) => AckType::NotFound,
        }
    }

    pub async fn offer_rematch(&self, id: SessionId, username: &str) -> AckType {
        match self.registry.get(id) {
            Ok(session) => session.offer_rematch(username).await,
            Err(_) => AckType::NotFound,
        }
    }

    /// Answer a rematch offer. Accepting opens a friend game between the same
    /// players, created by the responder, and invites both players to it.
    pub fn respond_to_rematch(&self, id: SessionId, username: &str, accept: bool) -> AckType {
        let Ok(session) = self.registry.get(id) else {
            return AckType::NotFound;
        };

        let ack = session.respond_to_rematch(username, accept);
        if !ack.is_success() || !accept {
            return ack;
        }

        let previous = session.players();
        let opponent = previous
            .side_of(username)
            .and_then(|side| previous.username(side.opposite()))
            .map(str::to_string);
        let old = session.config();
        let config = GameConfig {
            creator: username.to_string(),
            opponent: OpponentType::Friend,
            side_choice: old.side_choice,
            visible: old.visible,
            time_control: old.time_control,
        };
        let (players, _) = seat_players(username, opponent, old.side_choice);

        match self.launch(config, players) {
            Ok(rematch) => {
                tracing::info!(session_id = id, rematch_id = rematch.id(), "Rematch started");
                session.send_rematch_invitation(rematch.id());
            }
            Err(e) => {
                tracing::warn!(session_id = id, error = %e, "Failed to start rematch");
            }
        }

        ack
    }

    pub fn current_state(&self, id: SessionId) -> Result<GameStateDto, AppError> {
        Ok(self.registry.get(id)?.current_state())
    }

    /// Lobby listing of games that have not finished.
    pub fn game_rooms(&self, search: &GameRoomSearch) -> Vec<GameRoomDto> {
        self.registry
            .get_all()
            .into_iter()
            .filter(|session| session.phase() != Phase::Finished)
            .filter(|session| !search.spectateable || session.is_spectateable())
            .filter(|session| {
                !search.joinable
                    || (session.is_joinable() && session.can_username_join(&search.requester))
            })
            .map(|session| session.summary())
            .collect()
    }

    pub fn subscribe(&self, id: SessionId) -> Result<broadcast::Receiver<RoutedEvent>, AppError> {
        Ok(self.registry.get(id)?.subscribe())
    }

    /// Drop sessions that finished more than `retention` ago. Returns how
    /// many were removed.
    pub fn sweep_finished(&self, retention: chrono::Duration) -> usize {
        let cutoff = chrono::Utc::now() - retention;
        let mut removed = 0;
        for session in self.registry.get_all() {
            let expired = session.finished_at().is_some_and(|at| at <= cutoff);
            if expired && self.registry.remove(session.id()).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "Swept finished sessions");
        }
        removed
    }

    fn launch(&self, config: GameConfig, players: Players) -> Result<Arc<Session>, AppError> {
        let session = Session::new(config, players, (self.engines)(), None, self.event_buffer)?;
        let id = self.registry.add(Arc::clone(&session));
        session.initialize();

        let config = session.config();
        tracing::info!(
            session_id = id,
            creator = %config.creator,
            opponent = %config.opponent,
            base_secs = config.time_control.base_secs(),
            increment_secs = config.time_control.increment_secs(),
            "Game created"
        );

        Ok(session)
    }

    /// Let the AI move for as long as it is the AI's turn.
    async fn drive_ai(&self, session: &Arc<Session>) {
        let Some(source) = &self.move_source else {
            return;
        };

        while let Some((player, level)) = session.pending_ai_turn() {
            let fen = session.fen();
            let uci = match source.best_move(&fen, level).await {
                Ok(uci) => uci,
                Err(e) => {
                    tracing::warn!(session_id = session.id(), error = %e, "AI move unavailable");
                    return;
                }
            };

            let ack = match session.uci_to_move(&uci) {
                Ok(mv) => session.make_move(&player, &mv),
                Err(e) => {
                    tracing::warn!(session_id = session.id(), uci = %uci, error = %e, "AI move unreadable");
                    return;
                }
            };
            if !ack.is_success() {
                tracing::warn!(session_id = session.id(), uci = %uci, ack = %ack, "AI move rejected");
                return;
            }
        }
    }

    fn check_time_control(&self, request: &StartGameRequest) -> Result<(), AppError> {
        if request.duration_secs < self.limits.min_duration_secs {
            return Err(AppError::Validation(format!(
                "Game cannot last less than {} seconds",
                self.limits.min_duration_secs
            )));
        }
        if request.duration_secs > self.limits.max_duration_secs {
            return Err(AppError::Validation(format!(
                "Game cannot last longer than {} seconds",
                self.limits.max_duration_secs
            )));
        }
        if request.increment_secs > self.limits.max_increment_secs {
            return Err(AppError::Validation(format!(
                "Increment cannot exceed {} seconds",
                self.limits.max_increment_secs
            )));
        }
        Ok(())
    }
}

fn check_opponent(request: &StartGameRequest) -> Result<(), AppError> {
    if is_ai(&request.username) {
        return Err(AppError::Validation("Username is reserved for AI players".into()));
    }

    let opponent = request.opponent_name.as_deref();
    match request.opponent_type {
        OpponentType::Friend => match opponent {
            None => Err(AppError::Validation("Opponent is required".into())),
            Some(name) if name == request.username => {
                Err(AppError::Validation("Player cannot play against themselves".into()))
            }
            Some(name) if is_ai(name) => {
                Err(AppError::Validation("Opponent is an AI in a friend game".into()))
            }
            Some(_) => Ok(()),
        },
        OpponentType::Ai => match opponent {
            Some(name) if is_ai(name) => Ok(()),
            _ => Err(AppError::Validation("Opponent is not an AI in an AI game".into())),
        },
        OpponentType::Random => {
            if opponent.is_some() {
                return Err(AppError::Validation(
                    "Opponent cannot be chosen for a random game".into(),
                ));
            }
            if request.side != SideChoice::Random {
                return Err(AppError::Validation(
                    "Side cannot be chosen for a random game".into(),
                ));
            }
            Ok(())
        }
    }
}

/// Seat the creator by side choice. Returns the seats and whether the creator
/// plays white.
fn seat_players(creator: &str, opponent: Option<String>, choice: SideChoice) -> (Players, bool) {
    let creator_is_white = match choice {
        SideChoice::White => true,
        SideChoice::Black => false,
        SideChoice::Random => rand::random::<bool>(),
    };

    let creator = Some(creator.to_string());
    let players = if creator_is_white {
        Players::new(creator, opponent)
    } else {
        Players::new(opponent, creator)
    };
    (players, creator_is_white)
}
