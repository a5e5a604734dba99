//! Per-session rate limit on successful placements.

use time::{Duration, OffsetDateTime};

/// Session-scoped counters. Persisted through the preference store, never
/// part of the shared grid document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCounters {
    pub last_placed: Option<OffsetDateTime>,
    pub words_placed: u32,
}

#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown: Duration,
    counters: SessionCounters,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self::restore(cooldown, SessionCounters::default())
    }

    pub fn restore(cooldown: Duration, counters: SessionCounters) -> Self {
        Self { cooldown, counters }
    }

    /// Time left before the next placement is allowed, if any.
    ///
    /// A `last_placed` in the future (clock moved backwards since it was
    /// stored) never blocks for longer than one full cooldown.
    pub fn remaining(&self, now: OffsetDateTime) -> Option<Duration> {
        let last = self.counters.last_placed?;
        let elapsed = now - last;
        if elapsed >= self.cooldown {
            return None;
        }
        let left = self.cooldown - elapsed;
        Some(if left > self.cooldown {
            self.cooldown
        } else {
            left
        })
    }

    /// `Err(remaining)` while the gate is closed.
    pub fn check(&self, now: OffsetDateTime) -> Result<(), Duration> {
        match self.remaining(now) {
            Some(left) => Err(left),
            None => Ok(()),
        }
    }

    /// Record a successful placement at `now`.
    pub fn record(&mut self, now: OffsetDateTime) {
        self.counters.last_placed = Some(now);
        self.counters.words_placed = self.counters.words_placed.saturating_add(1);
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

/// Whole seconds to show the player, rounded up so "0s" is never shown
/// while still blocked.
pub fn display_secs(remaining: Duration) -> i64 {
    let secs = remaining.whole_seconds();
    if remaining - Duration::seconds(secs) > Duration::ZERO {
        secs + 1
    } else {
        secs
    }
}
