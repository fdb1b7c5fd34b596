//! Periodic timer that can be paused mid-period and resumed with the
//! remainder of the interrupted period.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::domain::value_objects::Side;

/// Tick period of a game clock.
pub const CLOCK_INTERVAL: Duration = Duration::from_millis(1000);

/// One elapsed period of a side's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub side: Side,
    /// Real length of the period that fired; shorter than the interval for
    /// the first tick after a resume.
    pub period: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

/// Shared between the timer and its ticking task. `live` names the task
/// generation allowed to emit ticks; pausing clears it under the same lock
/// the task takes before emitting, so a tick is either sent before the pause
/// measured its elapsed time or not at all.
#[derive(Debug)]
struct Stopwatch {
    boundary: Instant,
    period: Duration,
    live: Option<u64>,
}

#[derive(Debug)]
pub struct PausableTimer {
    side: Side,
    interval: Duration,
    remaining_after_pause_ms: f64,
    state: TimerState,
    generation: u64,
    stopwatch: Arc<Mutex<Stopwatch>>,
    task: Option<JoinHandle<()>>,
    ticks: mpsc::UnboundedSender<ClockTick>,
}

impl PausableTimer {
    /// Create a stopped timer that reports ticks for `side` on `ticks`.
    pub fn new(side: Side, interval: Duration, ticks: mpsc::UnboundedSender<ClockTick>) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            side,
            interval,
            remaining_after_pause_ms: 0.0,
            state: TimerState::Stopped,
            generation: 0,
            stopwatch: Arc::new(Mutex::new(Stopwatch {
                boundary: Instant::now(),
                period: interval,
                live: None,
            })),
            task: None,
            ticks,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining_after_pause_ms(&self) -> f64 {
        self.remaining_after_pause_ms
    }

    /// Reset the stopwatch and tick every interval. No-op while running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.spawn(self.interval);
    }

    /// Stop ticking and bank what is left of the current period.
    ///
    /// Returns the milliseconds elapsed since the last period boundary, or
    /// `0.0` without touching anything if the timer is not running.
    pub fn pause(&mut self) -> f64 {
        if !self.is_running() {
            return 0.0;
        }

        let (elapsed, period) = {
            let mut stopwatch = self.stopwatch.lock();
            stopwatch.live = None;
            (stopwatch.boundary.elapsed(), stopwatch.period)
        };
        self.abort_task();

        let elapsed_ms = as_millis_f64(elapsed);
        self.remaining_after_pause_ms = as_millis_f64(period) - elapsed_ms;
        self.state = TimerState::Paused;
        elapsed_ms
    }

    /// Resume ticking. The first period is the banked remainder when it is
    /// positive, otherwise a full interval; later periods are full intervals.
    /// A running timer restarts its current period.
    pub fn resume(&mut self) {
        let first = from_millis_f64(self.remaining_after_pause_ms).unwrap_or(self.interval);
        self.remaining_after_pause_ms = 0.0;
        self.spawn(first);
    }

    /// Stop ticking and forget any banked remainder.
    pub fn stop(&mut self) {
        self.stopwatch.lock().live = None;
        self.abort_task();
        self.remaining_after_pause_ms = 0.0;
        self.state = TimerState::Stopped;
    }

    fn spawn(&mut self, first: Duration) {
        self.abort_task();
        self.generation += 1;

        let generation = self.generation;
        let started = Instant::now();
        *self.stopwatch.lock() = Stopwatch {
            boundary: started,
            period: first,
            live: Some(generation),
        };

        let stopwatch = Arc::clone(&self.stopwatch);
        let ticks = self.ticks.clone();
        let side = self.side;
        let interval = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut period = first;
            let mut deadline = started + first;
            loop {
                tokio::time::sleep_until(deadline).await;
                {
                    let mut stopwatch = stopwatch.lock();
                    if stopwatch.live != Some(generation) {
                        break;
                    }
                    stopwatch.boundary = deadline;
                    stopwatch.period = interval;
                    if ticks.send(ClockTick { side, period }).is_err() {
                        break;
                    }
                }
                period = interval;
                deadline += interval;
            }
        }));
        self.state = TimerState::Running;
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Milliseconds in `duration`, keeping sub-millisecond precision.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// A positive millisecond amount as a duration, rounded to the nanosecond.
fn from_millis_f64(ms: f64) -> Option<Duration> {
    let nanos = (ms * 1_000_000.0).round();
    (nanos.is_finite() && nanos >= 1.0).then(|| Duration::from_nanos(nanos as u64))
}

impl Drop for PausableTimer {
    fn drop(&mut self) {
        self.stopwatch.lock().live = None;
        self.abort_task();
    }
}
