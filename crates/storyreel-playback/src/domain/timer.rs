//! Per-item auto-advance countdown.
//!
//! The timer is logical: it hands out a [`TimerTicket`] for the position it
//! was armed on and later judges whether a fire for that ticket is still
//! current. Actually sleeping is the session driver's job.

use std::time::Duration;

use chrono::{DateTime, Utc};
use storyreel_core::ids::StoryItemId;

use super::cursor::Position;

/// Identifies one arming of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket {
    /// Position the countdown belongs to.
    pub position: Position,
    /// Item active when armed.
    pub item_id: StoryItemId,
    /// Increments on every arm so re-arming the same position yields a
    /// distinct ticket.
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    ticket: TimerTicket,
    armed_at: DateTime<Utc>,
}

/// Countdown that fires at most once per arming.
#[derive(Debug)]
pub struct AutoAdvanceTimer {
    duration: Duration,
    armed: Option<Armed>,
    epoch: u64,
}

impl AutoAdvanceTimer {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            armed: None,
            epoch: 0,
        }
    }

    /// Full countdown length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts a fresh full-length countdown, replacing any armed one.
    pub fn arm(
        &mut self,
        position: Position,
        item_id: StoryItemId,
        now: DateTime<Utc>,
    ) -> TimerTicket {
        self.epoch += 1;
        let ticket = TimerTicket {
            position,
            item_id,
            epoch: self.epoch,
        };
        self.armed = Some(Armed {
            ticket,
            armed_at: now,
        });
        ticket
    }

    /// Drops the armed countdown. Elapsed time is not remembered.
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    /// The currently armed ticket.
    #[must_use]
    pub fn armed(&self) -> Option<TimerTicket> {
        self.armed.map(|armed| armed.ticket)
    }

    /// Consumes the armed countdown if `ticket` is the current one.
    /// Returns `false` for stale or unknown tickets.
    pub fn fire(&mut self, ticket: TimerTicket) -> bool {
        match self.armed {
            Some(armed) if armed.ticket == ticket => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    /// Fill of the current segment in percent, 0 when not armed.
    #[must_use]
    pub fn progress_percent(&self, elapsed: Duration) -> u8 {
        if self.armed.is_none() || self.duration.is_zero() {
            return 0;
        }
        let ratio = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (ratio.clamp(0.0, 1.0) * 100.0).round() as u8;
        percent
    }

    /// When the current countdown was armed.
    #[must_use]
    pub fn armed_at(&self) -> Option<DateTime<Utc>> {
        self.armed.map(|armed| armed.armed_at)
    }
}
