//! Hardware-independent core library for the sensor notifier
//!
//! On a button press the notifier averages an analog sensor, renders the value
//! into a short text message, posts it once to a remote service and reports the
//! outcome on two indicator lights. This crate holds all of that logic behind
//! small port traits so it compiles on both the ESP32-S3 firmware and desktop
//! hosts (the simulator and tests).
//!
//! ```text
//! button ─► debounce ─► sampling ─► message ─► delivery ─► indicator
//!                 ▲                                │
//!                 └──── TriggerState ◄─────────────┘ (control loop)
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

pub mod app_state;
pub mod config;
pub mod control;
pub mod debounce;
pub mod delivery;
pub mod diagnostics;
pub mod http;
pub mod indicator;
pub mod message;
pub mod network;
pub mod sampling;

#[cfg(test)]
pub(crate) mod testing;

pub use app_state::{AppError, AppRunState, TriggerState};
pub use config::NotifierConfig;
pub use control::{CycleState, Notifier, Peripherals, PollOutcome};
pub use debounce::{Clock, DebounceGate};
pub use delivery::{DeliveryClient, DeliveryError, DeliveryOutcome};
pub use diagnostics::{DiagnosticSink, LogSink};
pub use indicator::{Indicator, IndicatorError, Indicators};
pub use message::{Message, MessageTemplate, TemplateError};
pub use network::{Lease, LeaseMaintenance, LeaseTracker, MacAddress, NetworkStack};
pub use sampling::{AnalogInput, average};
