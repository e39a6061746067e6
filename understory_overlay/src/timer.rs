// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intent timers and repositioning throttle.
//!
//! The engine never reads a clock. Every call carries `now`, a monotonic
//! [`Duration`] since an origin of the host's choosing, and timers are plain
//! values with a due time. A host either polls
//! [`OverlayMachine::tick`](crate::machine::OverlayMachine::tick) or schedules a
//! real callback per [`TimerHandle`] and reports it back with
//! [`OverlayMachine::timer_fired`](crate::machine::OverlayMachine::timer_fired).

use core::time::Duration;

/// Kind of intent timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TimerKind {
    /// Hover intent: open when it fires.
    Open,
    /// Hide intent: close when it fires.
    Close,
}

/// Generational token identifying one armed timer.
///
/// Tokens from the same [`TimerSlot`] are strictly increasing, so a callback
/// carrying an older token can always be told apart from the live one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimerToken(u64);

/// A single armed timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TimerHandle {
    /// What happens when it fires.
    pub kind: TimerKind,
    /// Identity of this arming.
    pub token: TimerToken,
    /// Time at which it fires.
    pub due: Duration,
}

impl TimerHandle {
    /// True if the timer is due at `now`.
    pub fn is_due(&self, now: Duration) -> bool {
        self.due <= now
    }
}

/// Issues timer handles for one overlay instance.
///
/// The slot does not store the handle; its owner does, so that only one
/// handle can exist at a time. The slot only guarantees fresh tokens.
#[derive(Clone, Debug, Default)]
pub struct TimerSlot {
    next: u64,
}

impl TimerSlot {
    /// Create a slot whose first token is `TimerToken(1)`.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Arm a timer of `kind` that fires `delay` after `now`.
    pub fn arm(&mut self, kind: TimerKind, now: Duration, delay: Duration) -> TimerHandle {
        self.next = self.next.wrapping_add(1);
        TimerHandle {
            kind,
            token: TimerToken(self.next),
            due: now.saturating_add(delay),
        }
    }
}

/// Minimum-interval gate for repeated work such as repositioning.
///
/// The first request always passes. Later requests pass once `interval`
/// has elapsed since the last accepted one.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Duration>,
}

impl Throttle {
    /// Default repositioning interval.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    /// Create a throttle with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Minimum interval between accepted requests.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Request to run at `now`; returns whether the request is accepted.
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the last accepted time.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}
