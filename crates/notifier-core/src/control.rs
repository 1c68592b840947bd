//! Main control loop
//!
//! Every iteration starts in [`CycleState::Idle`]: the network gets its
//! housekeeping call and the button is polled. A press that passes the
//! debounce gate runs one full cycle before the button is looked at again:
//!
//! ```text
//! Idle ─► TriggerDetected ─► Sampling ─► Formatting ─► Delivering ─► Indicating ─┐
//!  ▲            │ (debounced)                                                    │
//!  └────────────┴────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything inside a cycle runs to completion. Presses made while sampling,
//! delivering or blinking are not seen.

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use log::{debug, info, trace, warn};

use crate::app_state::{AppError, AppRunState, TriggerState};
use crate::config::NotifierConfig;
use crate::debounce::{Clock, DebounceGate};
use crate::delivery::{DeliveryClient, DeliveryOutcome};
use crate::diagnostics::DiagnosticSink;
use crate::indicator::{Indicator, Indicators};
use crate::message::MessageTemplate;
use crate::network::{Lease, LeaseMaintenance, NetworkStack};
use crate::sampling::{self, AnalogInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    TriggerDetected,
    Sampling,
    Formatting,
    Delivering,
    Indicating,
}

/// What one call to [`Notifier::poll`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The button was not pressed
    Idle,
    /// The button was pressed inside the bounce window
    Debounced,
    /// A full cycle ran and ended with this delivery outcome
    Delivered(DeliveryOutcome),
}

/// Board-level inputs and outputs the loop drives
pub struct Peripherals<B, A, P, D, C> {
    /// Trigger button, active-high
    pub button: B,
    /// Analog sensor
    pub sensor: A,
    pub success_indicator: P,
    /// Busy while delivering, failure afterwards
    pub busy_indicator: P,
    pub delay: D,
    pub clock: C,
}

pub struct Notifier<'a, B, A, P, D, C, N, T, L> {
    config: NotifierConfig<'a>,
    template: MessageTemplate<'a>,
    gate: DebounceGate,
    trigger: TriggerState,
    run_state: AppRunState,
    state: CycleState,
    lease: Option<Lease>,
    button: B,
    sensor: A,
    indicators: Indicators<P>,
    delay: D,
    clock: C,
    network: N,
    delivery: T,
    sink: L,
}

impl<'a, B, A, P, D, C, N, T, L> Notifier<'a, B, A, P, D, C, N, T, L>
where
    B: InputPin,
    A: AnalogInput,
    P: embedded_hal::digital::OutputPin,
    D: DelayNs,
    C: Clock,
    N: NetworkStack,
    T: DeliveryClient,
    L: DiagnosticSink,
{
    /// Assemble the notifier. Fails only if the message template is invalid.
    pub fn new(
        config: NotifierConfig<'a>,
        peripherals: Peripherals<B, A, P, D, C>,
        network: N,
        delivery: T,
        sink: L,
    ) -> Result<Self, AppError> {
        let template = MessageTemplate::parse(config.message_template)?;

        Ok(Self {
            config,
            template,
            gate: DebounceGate::new(config.bounce_duration_ms),
            trigger: TriggerState::new(),
            run_state: AppRunState::Uninitialized,
            state: CycleState::Idle,
            lease: None,
            button: peripherals.button,
            sensor: peripherals.sensor,
            indicators: Indicators::new(
                peripherals.success_indicator,
                peripherals.busy_indicator,
            ),
            delay: peripherals.delay,
            clock: peripherals.clock,
            network,
            delivery,
            sink,
        })
    }

    /// Startup sequence: dark indicators, then wait for a network lease.
    ///
    /// Blocks until the network grants a lease, with no timeout.
    pub async fn start(&mut self) -> Lease {
        self.run_state = AppRunState::AcquiringLease;
        if let Err(e) = self.indicators.all_off() {
            warn!("{}", e);
        }

        let hardware_address = self.network.hardware_address();
        info!("Waiting for network lease for {}", hardware_address);
        self.diag(format_args!("Hardware address: {}", hardware_address));

        let lease = self.network.acquire_lease(hardware_address).await;
        info!("Lease acquired: {}", lease.ip);
        self.report_lease(&lease);

        self.lease = Some(lease);
        self.run_state = AppRunState::Running;
        lease
    }

    /// Run one loop iteration.
    pub async fn poll(&mut self) -> PollOutcome {
        self.enter(CycleState::Idle);

        let maintenance = self.network.maintain_lease().await;
        self.note_maintenance(maintenance);

        if !self.button_pressed() {
            return PollOutcome::Idle;
        }

        self.enter(CycleState::TriggerDetected);
        let now = self.clock.now_ms();
        if !self.gate.try_accept(&mut self.trigger, now) {
            trace!("Trigger at {}ms suppressed by debounce", now);
            self.enter(CycleState::Idle);
            return PollOutcome::Debounced;
        }

        info!("Trigger accepted at {}ms", now);
        let outcome = self.cycle().await;
        self.enter(CycleState::Idle);
        PollOutcome::Delivered(outcome)
    }

    /// Start, then poll forever.
    pub async fn run(&mut self) -> ! {
        self.start().await;
        loop {
            self.poll().await;
            self.delay.delay_ms(self.config.poll_interval_ms).await;
        }
    }

    /// Sample, format, deliver and show the outcome
    async fn cycle(&mut self) -> DeliveryOutcome {
        self.enter(CycleState::Sampling);
        let value = sampling::average(
            &mut self.sensor,
            &mut self.delay,
            self.config.sample_count,
            self.config.sample_interval_ms,
        )
        .await;
        debug!(
            "Averaged {} samples: {}",
            self.config.sample_count, value
        );

        self.enter(CycleState::Formatting);
        let message = self.template.render(value);
        self.diag(format_args!("Message: {}", message));

        self.enter(CycleState::Delivering);
        self.light(Indicator::Busy, true);
        let outcome = self.delivery.post(message.as_str()).await;

        self.enter(CycleState::Indicating);
        match outcome.into_result() {
            Ok(()) => {
                info!("Message delivered");
                self.diag(format_args!("Delivery: sent"));
                self.light(Indicator::Busy, false);
                self.blink(Indicator::Success).await;
            }
            Err(e) => {
                warn!("Delivery failed: {}", e);
                self.diag(format_args!("Delivery failed: {}", e));
                // The busy light stays on and blinks as the failure light
                self.blink(Indicator::Busy).await;
            }
        }

        outcome
    }

    fn button_pressed(&mut self) -> bool {
        match self.button.is_high() {
            Ok(pressed) => pressed,
            Err(e) => {
                warn!("Button read failed: {:?}", embedded_hal::digital::Error::kind(&e));
                false
            }
        }
    }

    fn light(&mut self, indicator: Indicator, on: bool) {
        if let Err(e) = self.indicators.set_steady(indicator, on) {
            warn!("{}", e);
        }
    }

    async fn blink(&mut self, indicator: Indicator) {
        let result = self
            .indicators
            .blink(
                indicator,
                self.config.blink_times,
                self.config.blink_period_ms,
                &mut self.delay,
            )
            .await;
        if let Err(e) = result {
            warn!("{}", e);
        }
    }

    fn note_maintenance(&mut self, maintenance: LeaseMaintenance) {
        match maintenance {
            LeaseMaintenance::Unchanged => {}
            LeaseMaintenance::Renewed(lease) => {
                info!("Lease renewed: {}", lease.ip);
                self.diag(format_args!("Lease renewed"));
                self.report_lease(&lease);
                self.lease = Some(lease);
            }
            LeaseMaintenance::Rebound(lease) => {
                info!("Lease rebound: {}", lease.ip);
                self.diag(format_args!("Lease rebound"));
                self.report_lease(&lease);
                self.lease = Some(lease);
            }
            LeaseMaintenance::Lost => {
                warn!("Network lease lost");
                self.diag(format_args!("Lease lost"));
                self.lease = None;
            }
        }
    }

    fn report_lease(&mut self, lease: &Lease) {
        self.diag(format_args!("IP address: {}", lease.ip));
        self.diag(format_args!("Gateway: {}", lease.gateway));
        self.diag(format_args!("DNS server: {}", lease.dns));
    }

    fn diag(&mut self, args: core::fmt::Arguments<'_>) {
        if self.config.diagnostics {
            self.sink.line(args);
        }
    }

    fn enter(&mut self, state: CycleState) {
        if self.state != state {
            debug!("{:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn run_state(&self) -> AppRunState {
        self.run_state
    }

    /// Current lease, if one is held
    pub fn lease(&self) -> Option<Lease> {
        self.lease
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.trigger
    }

    pub fn is_lit(&self, indicator: Indicator) -> bool {
        self.indicators.is_lit(indicator)
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn delivery(&self) -> &T {
        &self.delivery
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }
}
