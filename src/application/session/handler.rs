//! Session state machine
//!
//! A [`Session`] owns one game: its seats, rules engine, clock and the two
//! offer negotiations. All mutable state sits behind a single lock that
//! inbound operations and the clock pump both take, so racing finalizations
//! (flag fall, resignation, draw agreement) resolve as first-wins.
//!
//! Offers wait for their response outside the lock; the opponent's response
//! reaches the waiting offer through its cancel handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use super::ack::AckType;
use super::dual_clock::{ClockEvent, DualClock, TimerSelection};
use super::events::{
    published_ms, NewPositionEvent, PlayerJoinedEvent, ReachedEndOfGameEvent,
    RematchInvitationEvent, ResignationEvent, RoutedEvent, SessionEvent, TimeUpdateEvent,
};
use super::negotiation::{Negotiation, NegotiationKind, NegotiationTimer, Verdict};
use super::pausable_timer::ClockTick;
use super::SessionId;
use crate::application::dto::{GameRoomDto, GameStateDto};
use crate::domain::entities::{
    GameConfig, GameEndType, GameOutcome, GameRecord, OpponentType, Phase, Players,
};
use crate::domain::services::{EngineError, RulesEngine};
use crate::domain::value_objects::{
    is_ai, split_uci, AiLevel, ChessMove, MoveParseError, Side, Square, UciParts,
};
use crate::infrastructure::metrics;

struct SessionState {
    phase: Phase,
    first_move_played: bool,
    side_to_move: Side,
    outcome: Option<GameOutcome>,
    players: Players,
    engine: Box<dyn RulesEngine>,
    clock: DualClock,
    draw: Negotiation,
    rematch: Negotiation,
    offer_seq: u64,
    joinable: bool,
    joined: Vec<String>,
    spectators: u32,
    finished_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn negotiation(&self, kind: NegotiationKind) -> &Negotiation {
        match kind {
            NegotiationKind::Draw => &self.draw,
            NegotiationKind::Rematch => &self.rematch,
        }
    }

    fn negotiation_mut(&mut self, kind: NegotiationKind) -> &mut Negotiation {
        match kind {
            NegotiationKind::Draw => &mut self.draw,
            NegotiationKind::Rematch => &mut self.rematch,
        }
    }

    fn username(&self, side: Side) -> String {
        self.players.username(side).unwrap_or_default().to_string()
    }
}

/// One timed two-player game.
pub struct Session {
    id: AtomicU64,
    config: GameConfig,
    state: Mutex<SessionState>,
    events: broadcast::Sender<RoutedEvent>,
    ticks_rx: Mutex<Option<mpsc::UnboundedReceiver<ClockTick>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session on `fen`, or the start position.
    ///
    /// AI games start Active with the AI seat counted as joined.
    pub fn new(
        config: GameConfig,
        players: Players,
        mut engine: Box<dyn RulesEngine>,
        fen: Option<&str>,
        event_capacity: usize,
    ) -> Result<Arc<Self>, EngineError> {
        engine.new_game(fen)?;
        let side_to_move = engine.side_to_move();

        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let clock = DualClock::new(config.time_control, side_to_move, tick_tx);
        let (events, _) = broadcast::channel(event_capacity.max(1));

        let is_ai_game = config.opponent == OpponentType::Ai;
        let joined = match players.ai_side().and_then(|side| players.username(side)) {
            Some(ai) if is_ai_game => vec![ai.to_string()],
            _ => Vec::new(),
        };

        Ok(Arc::new(Self {
            id: AtomicU64::new(0),
            config,
            state: Mutex::new(SessionState {
                phase: if is_ai_game { Phase::Active } else { Phase::Created },
                first_move_played: false,
                side_to_move,
                outcome: None,
                players,
                engine,
                clock,
                draw: Negotiation::Idle,
                rematch: Negotiation::Idle,
                offer_seq: 0,
                joinable: true,
                joined,
                spectators: 0,
                finished_at: None,
            }),
            events,
            ticks_rx: Mutex::new(Some(tick_rx)),
        }))
    }

    /// Start the clock pump. Later calls do nothing.
    pub fn initialize(self: &Arc<Self>) {
        let Some(mut ticks) = self.ticks_rx.lock().take() else {
            return;
        };
        let session: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            while let Some(tick) = ticks.recv().await {
                let Some(session) = session.upgrade() else {
                    break;
                };
                session.handle_tick(tick);
            }
        });
    }

    /// Registry id, `0` until registered.
    pub fn id(&self) -> SessionId {
        self.id.load(Ordering::Acquire)
    }

    pub(crate) fn assign_id(&self, id: SessionId) {
        self.id.store(id, Ordering::Release);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Subscribe to the outgoing event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<RoutedEvent> {
        self.events.subscribe()
    }

    /// Created -> Active once both seats are taken. Does nothing once the
    /// game is running or over.
    pub fn player_joined(&self) {
        let mut state = self.state.lock();
        self.activate(&mut state);
    }

    /// Play a move for `mover`.
    pub fn make_move(&self, mover: &str, mv: &ChessMove) -> AckType {
        let mut state = self.state.lock();

        if state.phase != Phase::Active {
            return AckType::GameHasFinished;
        }

        let mover_side = state.engine.side_to_move();
        if state.players.username(mover_side) != Some(mover) {
            return AckType::NotUserTurn;
        }

        let mv = mv.normalized();
        if !state.engine.is_legal(&mv) {
            return AckType::InvalidMove;
        }
        if let Err(e) = state.engine.apply_move(&mv) {
            tracing::warn!(session_id = self.id(), error = %e, "Engine rejected a legal move");
            return AckType::InvalidMove;
        }

        if !state.first_move_played {
            state.first_move_played = true;
            state.clock.start_timers(TimerSelection::Both);
        }
        state.clock.update_timers(mover_side);
        state.side_to_move = state.engine.side_to_move();
        metrics::record_move();

        tracing::debug!(
            session_id = self.id(),
            player = %mover,
            mv = %mv.to_uci(),
            "Move applied"
        );

        let fen = state.engine.fen();
        let side_to_move = state.side_to_move;
        let time_left_ms = published_ms(state.clock.remaining_ms(side_to_move));

        let end = if state.engine.is_checkmate() {
            Some((GameOutcome::win_for(mover_side), GameEndType::Checkmate))
        } else if state.engine.has_no_legal_moves() && !state.engine.in_check() {
            Some((GameOutcome::Draw, GameEndType::Stalemate))
        } else {
            None
        };

        match end {
            Some((outcome, end)) => {
                if let Some(record) = self.finalize(&mut state, outcome, end) {
                    self.emit(
                        None,
                        SessionEvent::ReachedEndOfGame(ReachedEndOfGameEvent {
                            fen,
                            end,
                            side_to_move,
                            time_left_ms,
                        }),
                    );
                    self.emit(None, SessionEvent::GameFinished(record));
                }
            }
            None => self.emit(
                None,
                SessionEvent::NewPosition(NewPositionEvent {
                    fen,
                    side_to_move,
                    time_left_ms,
                }),
            ),
        }

        AckType::Success
    }

    /// Resign the game for `player`.
    pub fn resign(&self, player: &str) -> AckType {
        let mut state = self.state.lock();

        if state.phase != Phase::Active {
            return AckType::GameHasFinished;
        }
        let Some(side) = state.players.side_of(player) else {
            return AckType::NotUserTurn;
        };

        if let Some(record) =
            self.finalize(&mut state, GameOutcome::win_for(side.opposite()), GameEndType::Resignation)
        {
            tracing::info!(session_id = self.id(), player = %player, "Player resigned");
            self.emit(
                None,
                SessionEvent::Resignation(ResignationEvent { resigned: side }),
            );
            self.emit(None, SessionEvent::GameFinished(record));
        }

        AckType::Success
    }

    /// Offer a draw and wait up to ten seconds for the opponent.
    pub async fn offer_draw(&self, player: &str) -> AckType {
        self.offer(NegotiationKind::Draw, player).await
    }

    /// Answer the pending draw offer.
    pub fn respond_to_draw(&self, player: &str, accept: bool) -> AckType {
        self.respond(NegotiationKind::Draw, player, accept)
    }

    /// Offer a rematch and wait up to fifteen seconds for the opponent.
    pub async fn offer_rematch(&self, player: &str) -> AckType {
        self.offer(NegotiationKind::Rematch, player).await
    }

    /// Answer the pending rematch offer.
    pub fn respond_to_rematch(&self, player: &str, accept: bool) -> AckType {
        self.respond(NegotiationKind::Rematch, player, accept)
    }

    /// Tell both players where their rematch takes place.
    pub fn send_rematch_invitation(&self, new_session_id: SessionId) {
        let _state = self.state.lock();
        self.emit(
            None,
            SessionEvent::RematchInvitation(RematchInvitationEvent { new_session_id }),
        );
    }

    pub fn current_state(&self) -> GameStateDto {
        let state = self.state.lock();
        GameStateDto {
            fen: state.engine.fen(),
            white_time_left_ms: state.clock.remaining_ms(Side::White),
            black_time_left_ms: state.clock.remaining_ms(Side::Black),
            username_white: state.username(Side::White),
            username_black: state.username(Side::Black),
            side_to_move: state.side_to_move,
        }
    }

    pub fn fen(&self) -> String {
        self.state.lock().engine.fen()
    }

    /// Parse engine output such as `e2e4`, `e7e8q` or `e1g1` against the
    /// current position.
    pub fn uci_to_move(&self, uci: &str) -> Result<ChessMove, MoveParseError> {
        let parts = split_uci(uci)?;
        let state = self.state.lock();
        let candidates = candidate_moves(&parts, state.engine.en_passant_square());

        let chosen = candidates
            .iter()
            .copied()
            .find(|mv| state.engine.is_legal(mv))
            .unwrap_or(candidates[0]);
        Ok(chosen)
    }

    /// Take a seat. Joining the second seat activates the game.
    pub fn join(&self, username: &str) -> AckType {
        let mut state = self.state.lock();

        if !state.joinable || !self.can_join(&state, username) {
            return AckType::NotJoinable;
        }

        if !state.players.is_participant(username) && state.players.seat(username).is_none() {
            return AckType::NotJoinable;
        }
        if !state.joined.iter().any(|joined| joined == username) {
            state.joined.push(username.to_string());
        }

        tracing::info!(session_id = self.id(), player = %username, "Player joined");

        if state.joined.len() >= 2 {
            state.joinable = false;
            self.activate(&mut state);
        }

        AckType::Success
    }

    pub fn spectate(&self) -> AckType {
        let mut state = self.state.lock();
        if !self.spectateable(&state) {
            return AckType::NotSpectateable;
        }
        state.spectators += 1;
        AckType::Success
    }

    pub fn can_username_join(&self, username: &str) -> bool {
        let state = self.state.lock();
        self.can_join(&state, username)
    }

    pub fn is_joinable(&self) -> bool {
        self.state.lock().joinable
    }

    pub fn is_spectateable(&self) -> bool {
        let state = self.state.lock();
        self.spectateable(&state)
    }

    pub fn spectators(&self) -> u32 {
        self.state.lock().spectators
    }

    /// Lobby listing entry.
    pub fn summary(&self) -> GameRoomDto {
        let state = self.state.lock();
        GameRoomDto {
            session_id: self.id(),
            creator: self.config.creator.clone(),
            opponent: self.config.opponent,
            username_white: state.players.white.clone(),
            username_black: state.players.black.clone(),
            duration_secs: self.config.time_control.base_secs(),
            increment_secs: self.config.time_control.increment_secs(),
        }
    }

    /// AI player to move and its profile, while the game is running.
    pub fn pending_ai_turn(&self) -> Option<(String, AiLevel)> {
        let state = self.state.lock();
        if state.phase != Phase::Active {
            return None;
        }
        let player = state.players.username(state.engine.side_to_move())?;
        AiLevel::from_player(player).map(|level| (player.to_string(), level))
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.state.lock().outcome
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().finished_at
    }

    pub fn players(&self) -> Players {
        self.state.lock().players.clone()
    }

    pub fn side_to_move(&self) -> Side {
        self.state.lock().side_to_move
    }

    pub fn remaining_ms(&self, side: Side) -> f64 {
        self.state.lock().clock.remaining_ms(side)
    }

    pub fn is_clock_running(&self, side: Side) -> bool {
        self.state.lock().clock.is_running(side)
    }

    fn can_join(&self, state: &SessionState, username: &str) -> bool {
        if state.players.is_participant(username) {
            return true;
        }
        match self.config.opponent {
            OpponentType::Random | OpponentType::Ai => {
                !is_ai(username) && (state.players.white.is_none() || state.players.black.is_none())
            }
            OpponentType::Friend => false,
        }
    }

    fn spectateable(&self, state: &SessionState) -> bool {
        self.config.visible && !state.joinable
    }

    fn activate(&self, state: &mut SessionState) {
        if state.phase != Phase::Created {
            return;
        }
        state.phase = Phase::Active;

        let event = PlayerJoinedEvent {
            fen: state.engine.fen(),
            time_left_ms: state.clock.base_ms(),
            username_white: state.username(Side::White),
            username_black: state.username(Side::Black),
        };
        self.emit(None, SessionEvent::PlayerJoined(event));
    }

    async fn offer(&self, kind: NegotiationKind, player: &str) -> AckType {
        let (timer, seq, side) = match self.open_offer(kind, player) {
            Ok(opened) => opened,
            Err(ack) => return ack,
        };

        let pending = PendingOffer {
            session: self,
            kind,
            seq,
            side,
            settled: false,
        };
        let outcome = timer.start_and_await(kind.window()).await;
        tracing::debug!(session_id = self.id(), kind = kind.as_str(), ?outcome, "Offer wait ended");

        pending.settle()
    }

    fn open_offer(
        &self,
        kind: NegotiationKind,
        player: &str,
    ) -> Result<(NegotiationTimer, u64, Side), AckType> {
        let mut state = self.state.lock();

        if kind.requires_active() && state.phase != Phase::Active {
            return Err(AckType::GameHasFinished);
        }
        let Some(side) = state.players.side_of(player) else {
            return Err(AckType::NotUserTurn);
        };
        if state.negotiation(kind).is_pending() {
            return Err(AckType::OfferPending);
        }

        state.offer_seq += 1;
        let seq = state.offer_seq;
        let (timer, handle) = NegotiationTimer::new();
        *state.negotiation_mut(kind) = Negotiation::Offered {
            by: player.to_string(),
            seq,
            handle,
        };

        tracing::info!(session_id = self.id(), player = %player, kind = kind.as_str(), "Offer made");

        let target = state.players.username(side.opposite()).map(str::to_string);
        self.emit(target, SessionEvent::offer(kind, side));
        Ok((timer, seq, side))
    }

    fn settle_offer(&self, kind: NegotiationKind, seq: u64, side: Side) -> AckType {
        let mut state = self.state.lock();
        let verdict = state.negotiation_mut(kind).settle(seq);
        let game_over = kind.requires_active() && state.phase != Phase::Active;

        match verdict {
            Verdict::Expired if game_over => {}
            Verdict::Expired => self.emit(None, SessionEvent::offer_timeout(kind, side)),
            Verdict::Accepted => self.emit(None, SessionEvent::offer_accepted(kind, side)),
            Verdict::Declined => {}
        }

        tracing::info!(
            session_id = self.id(),
            kind = kind.as_str(),
            verdict = verdict.as_str(),
            "Offer settled"
        );
        metrics::record_negotiation(kind.as_str(), verdict.as_str());

        if verdict == Verdict::Expired && game_over {
            return AckType::GameHasFinished;
        }
        kind.ack_for(verdict)
    }

    fn respond(&self, kind: NegotiationKind, player: &str, accept: bool) -> AckType {
        let mut state = self.state.lock();

        if kind.requires_active() && state.phase != Phase::Active {
            return AckType::GameHasFinished;
        }
        let is_offerer = match state.negotiation(kind).pending_offerer() {
            Some(offerer) => offerer == player,
            None => return kind.not_offered(),
        };
        if is_offerer || !state.players.is_participant(player) {
            return AckType::NotUserTurn;
        }

        state.negotiation_mut(kind).respond(accept);

        if accept && kind == NegotiationKind::Draw {
            if let Some(record) =
                self.finalize(&mut state, GameOutcome::Draw, GameEndType::DrawAgreement)
            {
                self.emit(None, SessionEvent::GameFinished(record));
            }
        }

        AckType::Success
    }

    fn handle_tick(&self, tick: ClockTick) {
        let mut state = self.state.lock();
        if state.phase != Phase::Active {
            return;
        }

        match state.clock.on_tick(tick) {
            Some(ClockEvent::Tick { side, remaining_ms }) => self.emit(
                None,
                SessionEvent::TimeUpdate(TimeUpdateEvent {
                    side,
                    time_left_ms: published_ms(remaining_ms),
                    game_end: None,
                }),
            ),
            Some(ClockEvent::FlagFell {
                flagged,
                opponent_remaining_ms,
            }) => {
                tracing::info!(session_id = self.id(), side = %flagged, "Flag fell");
                let outcome = GameOutcome::win_for(flagged.opposite());
                if let Some(record) = self.finalize(&mut state, outcome, GameEndType::TimeIsUp) {
                    self.emit(
                        None,
                        SessionEvent::TimeUpdate(TimeUpdateEvent {
                            side: flagged,
                            time_left_ms: published_ms(opponent_remaining_ms),
                            game_end: Some(GameEndType::TimeIsUp),
                        }),
                    );
                    self.emit(None, SessionEvent::GameFinished(record));
                }
            }
            None => {}
        }
    }

    /// Enter Finished with `outcome`. Only the first call has any effect; it
    /// returns the record of the finished game.
    fn finalize(
        &self,
        state: &mut SessionState,
        outcome: GameOutcome,
        end: GameEndType,
    ) -> Option<GameRecord> {
        if state.outcome.is_some() {
            return None;
        }

        let finished_at = Utc::now();
        state.outcome = Some(outcome);
        state.phase = Phase::Finished;
        state.joinable = false;
        state.finished_at = Some(finished_at);
        state.clock.stop_timers(TimerSelection::Both);
        // A draw can no longer be agreed
        state.draw.withdraw();

        tracing::info!(
            session_id = self.id(),
            outcome = ?outcome,
            end = %end,
            "Game finished"
        );
        metrics::record_game_finished(end.as_str());

        Some(GameRecord {
            creator: self.config.creator.clone(),
            player_white: state.players.white.clone(),
            player_black: state.players.black.clone(),
            opponent: self.config.opponent,
            visible: self.config.visible,
            duration_secs: self.config.time_control.base_secs(),
            increment_secs: self.config.time_control.increment_secs(),
            outcome,
            end,
            final_fen: state.engine.fen(),
            finished_at,
        })
    }

    fn emit(&self, target: Option<String>, event: SessionEvent) {
        // No subscribers is not an error
        let _ = self.events.send(RoutedEvent {
            session_id: self.id(),
            target,
            event,
        });
    }
}

/// An offer waiting for its response. Settles the offer when dropped
/// unsettled, so a caller that stops waiting still closes it out.
struct PendingOffer<'a> {
    session: &'a Session,
    kind: NegotiationKind,
    seq: u64,
    side: Side,
    settled: bool,
}

impl PendingOffer<'_> {
    fn settle(mut self) -> AckType {
        self.settled = true;
        self.session.settle_offer(self.kind, self.seq, self.side)
    }
}

impl Drop for PendingOffer<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!(
            session_id = self.session.id(),
            kind = self.kind.as_str(),
            "Offer abandoned by its caller"
        );
        self.session.settle_offer(self.kind, self.seq, self.side);
    }
}

/// Interpretations of a UCI move in priority order: castling written as the
/// king's destination, en passant onto the engine's en passant square, then
/// promotion or a plain move.
fn candidate_moves(parts: &UciParts, en_passant: Option<Square>) -> Vec<ChessMove> {
    let mut candidates = Vec::with_capacity(2);
    let UciParts { from, to, promotion } = *parts;

    let king_home = from.file() == 4 && (from.rank() == 0 || from.rank() == 7);
    if king_home && to.rank() == from.rank() && matches!(to.file(), 2 | 6) && promotion.is_none() {
        candidates.push(ChessMove::castling(from, to).normalized());
    }
    if en_passant == Some(to) && promotion.is_none() {
        candidates.push(ChessMove::en_passant(from, to));
    }
    match promotion {
        Some(piece) => candidates.push(ChessMove::promotion(from, to, piece)),
        None => candidates.push(ChessMove::normal(from, to)),
    }

    candidates
}
