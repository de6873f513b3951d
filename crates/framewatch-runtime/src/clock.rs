#![forbid(unsafe_code)]

//! Refresh signal sources.
//!
//! The scheduler never sweeps on its own. It asks a [`FrameClock`] for the
//! next frame, and whoever owns the clock calls
//! [`FrameScheduler::tick`](crate::scheduler::FrameScheduler::tick) when
//! that frame arrives.
//!
//! - [`ManualClock`] records requests; tests decide when frames happen.
//! - [`IntervalClock`] paces frames at a fixed wall-clock interval.
//! - [`FrameDriver`] pumps any clock into a scheduler.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use web_time::{Duration, Instant};

use crate::config::SchedulerConfig;
use crate::scheduler::{FrameScheduler, TickReport};

/// A source of refresh signals.
pub trait FrameClock {
    /// Ask for one more frame. Requests made while a frame is already
    /// pending collapse into it.
    fn request_frame(&self);

    /// Drop any pending frame.
    fn cancel_frame(&self) {}

    /// Consume the pending frame, waiting for it if the clock paces frames.
    ///
    /// Returns `false` when no frame was requested.
    fn take_frame(&self) -> bool;
}

// ─── ManualClock ─────────────────────────────────────────────────────────────

/// Frame source driven by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    pending: Cell<bool>,
    requests: Cell<u64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame has been requested and not yet taken.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Total `request_frame` calls, including collapsed ones.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
        self.pending.set(true);
    }

    fn cancel_frame(&self) {
        self.pending.set(false);
    }

    fn take_frame(&self) -> bool {
        self.pending.replace(false)
    }
}

// ─── IntervalClock ───────────────────────────────────────────────────────────

/// Frame source that delivers at most one frame per `interval`.
pub struct IntervalClock {
    interval: Duration,
    last_frame: Cell<Option<Instant>>,
    pending: Cell<bool>,
}

impl IntervalClock {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_frame: Cell::new(None),
            pending: Cell::new(false),
        }
    }

    /// Clock paced at `config.frame_interval`.
    #[must_use]
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.frame_interval)
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the next frame may be delivered.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_frame.get() {
            Some(last) => (last + self.interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}

impl FrameClock for IntervalClock {
    fn request_frame(&self) {
        self.pending.set(true);
    }

    fn cancel_frame(&self) {
        self.pending.set(false);
    }

    fn take_frame(&self) -> bool {
        if !self.pending.replace(false) {
            return false;
        }
        let wait = self.remaining(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        self.last_frame.set(Some(Instant::now()));
        true
    }
}

impl fmt::Debug for IntervalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalClock")
            .field("interval", &self.interval)
            .field("pending", &self.pending.get())
            .finish_non_exhaustive()
    }
}

// ─── FrameDriver ─────────────────────────────────────────────────────────────

/// Pumps frames from a clock into a scheduler.
pub struct FrameDriver<K> {
    scheduler: FrameScheduler,
    clock: Rc<K>,
}

impl<K: FrameClock> FrameDriver<K> {
    /// `clock` must be the clock `scheduler` was built with, otherwise the
    /// driver never sees a frame request.
    #[must_use]
    pub fn new(scheduler: FrameScheduler, clock: Rc<K>) -> Self {
        Self { scheduler, clock }
    }

    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Deliver one frame if one was requested.
    pub fn step(&self) -> Option<TickReport> {
        self.clock
            .take_frame()
            .then(|| self.scheduler.tick())
    }

    /// Deliver up to `max_frames` frames, stopping early once the scheduler
    /// stops asking for them. Returns the number of sweeps run.
    pub fn run(&self, max_frames: usize) -> usize {
        let mut swept = 0;
        for _ in 0..max_frames {
            let Some(report) = self.step() else {
                break;
            };
            if report.swept {
                swept += 1;
            }
        }
        tracing::debug!(frames = swept, "frame driver idle");
        swept
    }
}

impl<K> fmt::Debug for FrameDriver<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDriver")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
