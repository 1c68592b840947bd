//! Compile-time configuration for the notifier
//!
//! Every tunable lives here as a constant. [`NotifierConfig::DEFAULT`] bundles
//! them into the value the control loop is built with; tests construct their
//! own values to shrink sample counts and blink sequences.

use core::num::NonZeroU16;

use crate::network::MacAddress;

/// Minimum spacing between two accepted button triggers (milliseconds)
pub const BOUNCE_DURATION_MS: u32 = 200;

/// Number of analog samples averaged per trigger
pub const SAMPLE_COUNT: NonZeroU16 = match NonZeroU16::new(30) {
    Some(count) => count,
    None => panic!("sample count must be non-zero"),
};

/// Pause between two consecutive analog samples (milliseconds)
pub const SAMPLE_INTERVAL_MS: u32 = 10;

/// On/off cycles shown on an indicator after a delivery attempt
pub const BLINK_TIMES: u16 = 10;

/// Duration of each blink phase (milliseconds)
pub const BLINK_PERIOD_MS: u32 = 100;

/// Message sent for every accepted trigger; `%d` receives the averaged value
pub const MESSAGE_TEMPLATE: &str = "Sensor Value: %d";

/// Status code the posting service answers with when it accepted a message
pub const SUCCESS_STATUS: u16 = 200;

/// Idle pause between loop iterations so the executor can service the network
pub const POLL_INTERVAL_MS: u32 = 10;

/// Hardware address presented to the network when acquiring a lease
pub const DEFAULT_HARDWARE_ADDRESS: MacAddress =
    MacAddress::new([0xDE, 0xAD, 0xBE, 0xEF, 0xFE, 0xED]);

/// Whether diagnostic lines are written at all (cargo feature `diagnostics`)
pub const DIAGNOSTICS: bool = cfg!(feature = "diagnostics");

/// Full set of tunables handed to [`crate::Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierConfig<'a> {
    pub bounce_duration_ms: u32,
    pub sample_count: NonZeroU16,
    pub sample_interval_ms: u32,
    pub blink_times: u16,
    pub blink_period_ms: u32,
    pub message_template: &'a str,
    pub poll_interval_ms: u32,
    pub diagnostics: bool,
}

impl NotifierConfig<'static> {
    /// The configuration the firmware and simulator ship with
    pub const DEFAULT: Self = Self {
        bounce_duration_ms: BOUNCE_DURATION_MS,
        sample_count: SAMPLE_COUNT,
        sample_interval_ms: SAMPLE_INTERVAL_MS,
        blink_times: BLINK_TIMES,
        blink_period_ms: BLINK_PERIOD_MS,
        message_template: MESSAGE_TEMPLATE,
        poll_interval_ms: POLL_INTERVAL_MS,
        diagnostics: DIAGNOSTICS,
    };
}

impl Default for NotifierConfig<'static> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<'a> NotifierConfig<'a> {
    /// Replace the message template
    pub const fn with_template(mut self, template: &'a str) -> Self {
        self.message_template = template;
        self
    }
}
