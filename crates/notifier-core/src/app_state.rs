//! Application-wide state and error types for the notifier

use thiserror_no_std::Error;

use crate::message::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    Uninitialized,
    AcquiringLease,
    Running,
}

/// State carried from one loop iteration to the next.
///
/// Only the time of the last accepted trigger survives a cycle; everything
/// else (samples, message, outcome) is recomputed per trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerState {
    last_accepted_ms: Option<u32>,
}

impl TriggerState {
    pub const fn new() -> Self {
        Self {
            last_accepted_ms: None,
        }
    }

    pub const fn last_accepted_ms(&self) -> Option<u32> {
        self.last_accepted_ms
    }

    pub fn record(&mut self, now_ms: u32) {
        self.last_accepted_ms = Some(now_ms);
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Message template rejected: {0}")]
    Template(#[from] TemplateError),
    #[error("Network bring-up failed: {0}")]
    Network(heapless::String<64>),
}

impl AppError {
    /// Build a network error, truncating the detail to fit.
    pub fn network(detail: &str) -> Self {
        Self::Network(truncated(detail))
    }
}

fn truncated<const N: usize>(detail: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in detail.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
