//! Debounce gate for the trigger button
//!
//! A mechanical button bounces for a few milliseconds after it closes, and a
//! held button keeps reading "pressed". The gate only admits a trigger once
//! more than the bounce duration has passed since the last accepted one.
//!
//! Timestamps are wrapping millisecond counters. The elapsed time is computed
//! with `wrapping_sub`, which stays correct across the `u32::MAX -> 0` wrap as
//! long as two triggers are less than ~49 days apart.

use crate::app_state::TriggerState;

/// Wrapping monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Pure guard deciding whether a trigger may proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceGate {
    bounce_duration_ms: u32,
}

impl DebounceGate {
    pub const fn new(bounce_duration_ms: u32) -> Self {
        Self { bounce_duration_ms }
    }

    pub const fn bounce_duration_ms(&self) -> u32 {
        self.bounce_duration_ms
    }

    /// Returns true when a trigger at `now_ms` is far enough from `last_ms`.
    ///
    /// With no previous trigger every press is admitted.
    pub const fn admits(&self, last_ms: Option<u32>, now_ms: u32) -> bool {
        match last_ms {
            Some(last) => now_ms.wrapping_sub(last) > self.bounce_duration_ms,
            None => true,
        }
    }

    /// Check the trigger against `state` and record it when admitted.
    ///
    /// A rejected trigger leaves `state` untouched.
    pub fn try_accept(&self, state: &mut TriggerState, now_ms: u32) -> bool {
        if self.admits(state.last_accepted_ms(), now_ms) {
            state.record(now_ms);
            true
        } else {
            false
        }
    }
}
