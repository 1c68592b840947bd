//! Fakes for host tests
//!
//! All fakes share one [`VirtualTime`]: delays advance it instantly, the clock
//! and the scripted button read it, and every observable side effect is
//! appended to a [`Trace`] stamped with the virtual time.

use core::convert::Infallible;
use core::fmt;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::debounce::Clock;
use crate::delivery::{DeliveryClient, DeliveryOutcome};
use crate::diagnostics::DiagnosticSink;
use crate::indicator::Indicator;
use crate::network::{Lease, LeaseMaintenance, MacAddress, NetworkStack};
use crate::sampling::AnalogInput;

/// Shared virtual time in nanoseconds
#[derive(Debug, Clone, Default)]
pub struct VirtualTime(Rc<Cell<u64>>);

impl VirtualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u32 {
        (self.0.get() / 1_000_000) as u32
    }

    pub fn set_ms(&self, ms: u32) {
        self.0.set(u64::from(ms) * 1_000_000);
    }

    pub fn advance_ns(&self, ns: u64) {
        self.0.set(self.0.get() + ns);
    }
}

pub struct FakeClock(pub VirtualTime);

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        self.0.now_ms()
    }
}

pub struct FakeDelay(VirtualTime);

impl FakeDelay {
    pub fn new(time: VirtualTime) -> Self {
        Self(time)
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.advance_ns(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.0.advance_ns(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.advance_ns(u64::from(ms) * 1_000_000);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub indicator: Indicator,
    pub on: bool,
    pub at_ms: u32,
}

impl PinEvent {
    pub const fn new(indicator: Indicator, on: bool, at_ms: u32) -> Self {
        Self {
            indicator,
            on,
            at_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pin(PinEvent),
    Post { message: String, at_ms: u32 },
}

/// Ordered record of side effects
#[derive(Debug, Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<Event>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn pin_events(&self) -> Vec<PinEvent> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Pin(pin) => Some(*pin),
                Event::Post { .. } => None,
            })
            .collect()
    }

    pub fn posts(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Post { message, .. } => Some(message.clone()),
                Event::Pin(_) => None,
            })
            .collect()
    }

    /// Number of times `indicator` was switched on
    pub fn times_lit(&self, indicator: Indicator) -> usize {
        self.pin_events()
            .iter()
            .filter(|e| e.indicator == indicator && e.on)
            .count()
    }

    /// Replay the pin events and panic if both lights were ever lit together
    pub fn assert_never_both_lit(&self) {
        let mut lit = [false; 2];
        for event in self.pin_events() {
            lit[event.indicator as usize] = event.on;
            assert!(
                !(lit[0] && lit[1]),
                "both indicators lit at {}ms",
                event.at_ms
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakePinError;

impl digital::Error for FakePinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin recording its transitions
pub struct FakePin {
    indicator: Indicator,
    trace: Trace,
    time: VirtualTime,
    fail: bool,
}

impl FakePin {
    pub fn new(indicator: Indicator, trace: Trace, time: VirtualTime) -> Self {
        Self {
            indicator,
            trace,
            time,
            fail: false,
        }
    }

    pub fn fail_writes(&mut self) {
        self.fail = true;
    }

    fn write(&mut self, on: bool) -> Result<(), FakePinError> {
        if self.fail {
            return Err(FakePinError);
        }
        self.trace.push(Event::Pin(PinEvent::new(
            self.indicator,
            on,
            self.time.now_ms(),
        )));
        Ok(())
    }
}

impl ErrorType for FakePin {
    type Error = FakePinError;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

/// Button that reads high inside scripted `[start, end)` windows
pub struct ScriptedButton {
    time: VirtualTime,
    presses: Vec<(u32, u32)>,
}

impl ScriptedButton {
    pub fn new(time: VirtualTime, presses: &[(u32, u32)]) -> Self {
        Self {
            time,
            presses: presses.to_vec(),
        }
    }
}

impl ErrorType for ScriptedButton {
    type Error = Infallible;
}

impl InputPin for ScriptedButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let now = self.time.now_ms();
        Ok(self
            .presses
            .iter()
            .any(|&(start, end)| (start..end).contains(&now)))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Sensor replaying a fixed sample sequence, cycling when exhausted
pub struct FakeSensor {
    samples: Vec<i32>,
    reads: usize,
}

impl FakeSensor {
    pub fn new(samples: &[i32]) -> Self {
        assert!(!samples.is_empty());
        Self {
            samples: samples.to_vec(),
            reads: 0,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl AnalogInput for FakeSensor {
    async fn read(&mut self) -> i32 {
        let sample = self.samples[self.reads % self.samples.len()];
        self.reads += 1;
        sample
    }
}

pub struct FakeNetwork {
    pub lease: Lease,
    pub hardware_address: MacAddress,
    pub acquired_for: Option<MacAddress>,
    pub maintain_calls: usize,
    pub maintenance: VecDeque<LeaseMaintenance>,
}

impl FakeNetwork {
    pub fn new(lease: Lease) -> Self {
        Self {
            lease,
            hardware_address: MacAddress::new([0x02, 0, 0, 0, 0, 0x01]),
            acquired_for: None,
            maintain_calls: 0,
            maintenance: VecDeque::new(),
        }
    }
}

impl NetworkStack for FakeNetwork {
    fn hardware_address(&self) -> MacAddress {
        self.hardware_address
    }

    async fn acquire_lease(&mut self, hardware_address: MacAddress) -> Lease {
        self.acquired_for = Some(hardware_address);
        self.lease
    }

    async fn maintain_lease(&mut self) -> LeaseMaintenance {
        self.maintain_calls += 1;
        self.maintenance
            .pop_front()
            .unwrap_or(LeaseMaintenance::Unchanged)
    }
}

/// Delivery answering with scripted outcomes (`Sent` once the script runs out)
pub struct FakeDelivery {
    trace: Trace,
    time: VirtualTime,
    outcomes: VecDeque<DeliveryOutcome>,
}

impl FakeDelivery {
    pub fn new(trace: Trace, time: VirtualTime, outcomes: &[DeliveryOutcome]) -> Self {
        Self {
            trace,
            time,
            outcomes: outcomes.iter().copied().collect(),
        }
    }
}

impl DeliveryClient for FakeDelivery {
    async fn post(&mut self, message: &str) -> DeliveryOutcome {
        self.trace.push(Event::Post {
            message: message.to_string(),
            at_ms: self.time.now_ms(),
        });
        self.outcomes.pop_front().unwrap_or(DeliveryOutcome::Sent)
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl RecordingSink {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticSink for RecordingSink {
    fn line(&mut self, args: fmt::Arguments<'_>) {
        self.lines.push(args.to_string());
    }
}
