//! # Game Sessions
//!
//! The live part of a game: clocks, offers, the per-session state machine
//! and the registry that hands out session ids.
//!
//! - **PausableTimer**: periodic timer that banks the rest of an interrupted period
//! - **DualClock**: one timer per side plus increment bookkeeping
//! - **NegotiationTimer**: cancelable deadline for draw and rematch offers
//! - **Session**: state machine publishing [`RoutedEvent`]s
//! - **SessionRegistry**: id allocation and lookup

pub mod ack;
pub mod dual_clock;
pub mod events;
pub mod handler;
pub mod negotiation;
pub mod pausable_timer;
pub mod registry;

/// Registry-assigned session identifier.
pub type SessionId = u64;

pub use ack::AckType;
pub use dual_clock::{ClockEvent, DualClock, TimerSelection};
pub use events::{RoutedEvent, SessionEvent};
pub use handler::Session;
pub use negotiation::{
    CancelHandle, Negotiation, NegotiationKind, NegotiationOutcome, NegotiationTimer, Verdict,
    DRAW_OFFER_WINDOW, REMATCH_OFFER_WINDOW,
};
pub use pausable_timer::{ClockTick, PausableTimer, TimerState, CLOCK_INTERVAL};
pub use registry::SessionRegistry;
