//! Two-sided game clock with increment.
//!
//! Owns one [`PausableTimer`] per side. Exactly one of them runs while the
//! clock is started; the owner feeds every [`ClockTick`] back through
//! [`DualClock::on_tick`] under its own lock.

use tokio::sync::mpsc;

use super::pausable_timer::{as_millis_f64, ClockTick, PausableTimer, CLOCK_INTERVAL};
use crate::domain::value_objects::{Side, TimeControl};

/// Which timers a start/stop call applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSelection {
    Both,
    Side(Side),
}

impl TimerSelection {
    fn includes(&self, side: Side) -> bool {
        match self {
            Self::Both => true,
            Self::Side(selected) => *selected == side,
        }
    }
}

/// Result of feeding a tick to the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    /// A period elapsed on `side`
    Tick { side: Side, remaining_ms: f64 },
    /// `flagged` ran out of time; both timers are stopped
    FlagFell {
        flagged: Side,
        opponent_remaining_ms: f64,
    },
}

#[derive(Debug)]
pub struct DualClock {
    base_ms: f64,
    increment_ms: f64,
    white_remaining_ms: f64,
    black_remaining_ms: f64,
    active_side: Side,
    white: PausableTimer,
    black: PausableTimer,
    stopped: bool,
}

impl DualClock {
    pub fn new(
        time_control: TimeControl,
        initial_side: Side,
        ticks: mpsc::UnboundedSender<ClockTick>,
    ) -> Self {
        let base_ms = time_control.base_ms();
        Self {
            base_ms,
            increment_ms: time_control.increment_ms(),
            white_remaining_ms: base_ms,
            black_remaining_ms: base_ms,
            active_side: initial_side,
            white: PausableTimer::new(Side::White, CLOCK_INTERVAL, ticks.clone()),
            black: PausableTimer::new(Side::Black, CLOCK_INTERVAL, ticks),
            stopped: false,
        }
    }

    pub fn start_timers(&mut self, selection: TimerSelection) {
        if self.stopped {
            return;
        }
        for side in [Side::White, Side::Black] {
            if selection.includes(side) {
                self.timer_mut(side).start();
            }
        }
    }

    /// Stop the selected timers. Stopping both is terminal: later calls and
    /// ticks are ignored.
    pub fn stop_timers(&mut self, selection: TimerSelection) {
        if self.stopped {
            return;
        }
        for side in [Side::White, Side::Black] {
            if selection.includes(side) {
                self.timer_mut(side).stop();
            }
        }
        if selection == TimerSelection::Both {
            self.stopped = true;
        }
    }

    /// Hand the clock over after `moved` completed a move: credit the
    /// increment, debit the part of the current period already used, then
    /// resume the opponent's timer.
    pub fn update_timers(&mut self, moved: Side) {
        if self.stopped {
            return;
        }
        let increment = self.increment_ms;
        *self.remaining_mut(moved) += increment;
        let elapsed = self.timer_mut(moved).pause();
        *self.remaining_mut(moved) -= elapsed;

        let next = moved.opposite();
        self.active_side = next;
        self.timer_mut(next).resume();
    }

    /// Debit a tick from the side it belongs to.
    pub fn on_tick(&mut self, tick: ClockTick) -> Option<ClockEvent> {
        if self.stopped {
            return None;
        }
        *self.remaining_mut(tick.side) -= as_millis_f64(tick.period);

        let flagged = [Side::White, Side::Black]
            .into_iter()
            .find(|side| self.remaining_ms(*side) <= 0.0);

        match flagged {
            Some(flagged) => {
                self.stop_timers(TimerSelection::Both);
                Some(ClockEvent::FlagFell {
                    flagged,
                    opponent_remaining_ms: self.remaining_ms(flagged.opposite()),
                })
            }
            None => Some(ClockEvent::Tick {
                side: tick.side,
                remaining_ms: self.remaining_ms(tick.side),
            }),
        }
    }

    pub fn remaining_ms(&self, side: Side) -> f64 {
        match side {
            Side::White => self.white_remaining_ms,
            Side::Black => self.black_remaining_ms,
        }
    }

    pub fn base_ms(&self) -> f64 {
        self.base_ms
    }

    pub fn increment_ms(&self) -> f64 {
        self.increment_ms
    }

    pub fn active_side(&self) -> Side {
        self.active_side
    }

    pub fn is_running(&self, side: Side) -> bool {
        match side {
            Side::White => self.white.is_running(),
            Side::Black => self.black.is_running(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn remaining_mut(&mut self, side: Side) -> &mut f64 {
        match side {
            Side::White => &mut self.white_remaining_ms,
            Side::Black => &mut self.black_remaining_ms,
        }
    }

    fn timer_mut(&mut self, side: Side) -> &mut PausableTimer {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }
}
