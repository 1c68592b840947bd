//! Indicator driver for the two status lights
//!
//! The busy light doubles as the failure light: it is lit while a delivery is
//! in flight and blinks when the delivery failed. The success light only
//! blinks, after the busy light has been switched off.

use core::fmt;

use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};
use embedded_hal_async::delay::DelayNs;
use log::debug;
use thiserror_no_std::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Success,
    /// Busy while delivering, failure afterwards
    Busy,
}

impl Indicator {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{indicator} indicator write failed: {kind:?}")]
pub struct IndicatorError {
    pub indicator: Indicator,
    pub kind: ErrorKind,
}

/// The pair of status lights
pub struct Indicators<P> {
    success: P,
    busy: P,
    lit: [bool; 2],
}

impl<P: OutputPin> Indicators<P> {
    pub fn new(success: P, busy: P) -> Self {
        Self {
            success,
            busy,
            lit: [false; 2],
        }
    }

    /// Switch both lights off
    pub fn all_off(&mut self) -> Result<(), IndicatorError> {
        self.set_steady(Indicator::Success, false)?;
        self.set_steady(Indicator::Busy, false)
    }

    /// Set a light on or off immediately
    pub fn set_steady(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        let pin = match indicator {
            Indicator::Success => &mut self.success,
            Indicator::Busy => &mut self.busy,
        };

        let result = if on { pin.set_high() } else { pin.set_low() };
        result.map_err(|e| IndicatorError {
            indicator,
            kind: e.kind(),
        })?;

        self.lit[indicator as usize] = on;
        debug!("{} indicator {}", indicator, if on { "on" } else { "off" });
        Ok(())
    }

    /// Blink a light `times` times, each phase held for `period_ms`.
    ///
    /// Holds the caller for `2 * times * period_ms` and leaves the light off.
    pub async fn blink<D: DelayNs>(
        &mut self,
        indicator: Indicator,
        times: u16,
        period_ms: u32,
        delay: &mut D,
    ) -> Result<(), IndicatorError> {
        for _ in 0..times {
            self.set_steady(indicator, true)?;
            delay.delay_ms(period_ms).await;
            self.set_steady(indicator, false)?;
            delay.delay_ms(period_ms).await;
        }
        Ok(())
    }

    pub fn is_lit(&self, indicator: Indicator) -> bool {
        self.lit[indicator as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDelay, FakePin, PinEvent, Trace, VirtualTime};
    use embassy_futures::block_on;

    fn setup() -> (Indicators<FakePin>, FakeDelay, Trace, VirtualTime) {
        let time = VirtualTime::new();
        let trace = Trace::new();
        let indicators = Indicators::new(
            FakePin::new(Indicator::Success, trace.clone(), time.clone()),
            FakePin::new(Indicator::Busy, trace.clone(), time.clone()),
        );
        (indicators, FakeDelay::new(time.clone()), trace, time)
    }

    #[test]
    fn test_set_steady() {
        let (mut indicators, _, trace, _) = setup();

        indicators.set_steady(Indicator::Busy, true).unwrap();
        assert!(indicators.is_lit(Indicator::Busy));
        assert!(!indicators.is_lit(Indicator::Success));

        indicators.set_steady(Indicator::Busy, false).unwrap();
        assert!(!indicators.is_lit(Indicator::Busy));
        assert_eq!(
            trace.pin_events(),
            [
                PinEvent::new(Indicator::Busy, true, 0),
                PinEvent::new(Indicator::Busy, false, 0),
            ]
        );
    }

    #[test]
    fn test_blink_timing() {
        let (mut indicators, mut delay, trace, time) = setup();

        block_on(indicators.blink(Indicator::Success, 3, 100, &mut delay)).unwrap();

        assert_eq!(time.now_ms(), 600, "blink must hold for 2 * times * period");
        assert!(!indicators.is_lit(Indicator::Success));
        assert_eq!(
            trace.pin_events(),
            [
                PinEvent::new(Indicator::Success, true, 0),
                PinEvent::new(Indicator::Success, false, 100),
                PinEvent::new(Indicator::Success, true, 200),
                PinEvent::new(Indicator::Success, false, 300),
                PinEvent::new(Indicator::Success, true, 400),
                PinEvent::new(Indicator::Success, false, 500),
            ]
        );
    }

    #[test]
    fn test_blink_zero_times() {
        let (mut indicators, mut delay, trace, time) = setup();

        block_on(indicators.blink(Indicator::Busy, 0, 100, &mut delay)).unwrap();
        assert_eq!(time.now_ms(), 0);
        assert!(trace.pin_events().is_empty());
    }

    #[test]
    fn test_pin_failure_is_reported() {
        let time = VirtualTime::new();
        let trace = Trace::new();
        let mut success = FakePin::new(Indicator::Success, trace.clone(), time.clone());
        success.fail_writes();
        let mut indicators =
            Indicators::new(success, FakePin::new(Indicator::Busy, trace.clone(), time));

        let err = indicators.set_steady(Indicator::Success, true).unwrap_err();
        assert_eq!(err.indicator, Indicator::Success);
        assert_eq!(err.kind, ErrorKind::Other);
        assert!(!indicators.is_lit(Indicator::Success));
        assert!(trace.pin_events().is_empty());
    }
}
