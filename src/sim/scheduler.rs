//! Tick and animation timing
//!
//! Neither clock free-runs: the tick scheduler only arms the next tick once
//! the current one has finished, and the animation clock only advances while
//! the player is actually moving.

use serde::{Deserialize, Serialize};

/// Self-rescheduling tick timer with phase-preserving pause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickScheduler {
    period_ms: f64,
    /// When the next tick is due (None while paused or not started)
    next_due: Option<f64>,
    /// Time left until the next tick at the moment of pausing
    paused_remaining: Option<f64>,
}

impl TickScheduler {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            next_due: None,
            paused_remaining: None,
        }
    }

    /// Arm the first tick one period from `now`
    pub fn start(&mut self, now: f64) {
        self.next_due = Some(now + self.period_ms);
        self.paused_remaining = None;
    }

    pub fn is_paused(&self) -> bool {
        self.paused_remaining.is_some()
    }

    /// Is a tick due at `now`?
    pub fn is_due(&self, now: f64) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Call once a tick has finished running; the next one is a full period
    /// after completion, so a slow tick pushes the schedule back
    pub fn complete(&mut self, finished_at: f64) {
        if !self.is_paused() {
            self.next_due = Some(finished_at + self.period_ms);
        }
    }

    /// Cancel the pending tick, remembering how long it still had to wait
    pub fn pause(&mut self, now: f64) {
        if let Some(due) = self.next_due.take() {
            let remaining = (due - now).max(0.0);
            self.paused_remaining = Some(remaining);
            log::debug!("Paused with {:.1}ms until next tick", remaining);
        }
    }

    /// Re-arm with exactly the remainder recorded at pause time
    pub fn resume(&mut self, now: f64) {
        if let Some(remaining) = self.paused_remaining.take() {
            self.next_due = Some(now + remaining);
        }
    }

    /// Pause if running, resume if paused
    pub fn toggle(&mut self, now: f64) -> bool {
        if self.is_paused() {
            self.resume(now);
        } else {
            self.pause(now);
        }
        self.is_paused()
    }

    /// Milliseconds until the next tick (None while paused)
    pub fn time_until_due(&self, now: f64) -> Option<f64> {
        self.next_due.map(|due| (due - now).max(0.0))
    }
}

/// Number of frames in the walk cycle
pub const WALK_FRAMES: u8 = 8;

/// Walk-cycle frame counter that only runs while the player moves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationClock {
    period_ms: f64,
    frame: u8,
    next_due: Option<f64>,
}

impl AnimationClock {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            frame: 1,
            next_due: None,
        }
    }

    /// Current frame, `1..=WALK_FRAMES`
    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Feed whether the player moved since the last check. Returns `true`
    /// when the frame advanced.
    pub fn update(&mut self, now: f64, moved: bool) -> bool {
        if !moved {
            self.next_due = None;
            return false;
        }
        match self.next_due {
            None => {
                self.next_due = Some(now + self.period_ms);
                false
            }
            Some(due) if now >= due => {
                self.frame = self.frame % WALK_FRAMES + 1;
                self.next_due = Some(now + self.period_ms);
                true
            }
            Some(_) => false,
        }
    }
}
