//! ESP32-S3 board adapters for the notifier ports
//!
//! Pin assignment:
//! - GPIO4: trigger button (pull-down, active-high)
//! - GPIO1: analog sensor on ADC1, 11 dB attenuation (0..=4095)
//! - GPIO5: success indicator
//! - GPIO6: busy/failure indicator

use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcChannel, AdcPin};
use esp_hal::peripherals::ADC1;
use notifier_core::{AnalogInput, Clock};

/// One-shot ADC reads from a single pin
pub struct AdcSensor<'d, PIN> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    pin: AdcPin<PIN, ADC1<'d>>,
}

impl<'d, PIN> AdcSensor<'d, PIN>
where
    PIN: AdcChannel,
{
    pub fn new(adc: Adc<'d, ADC1<'d>, Blocking>, pin: AdcPin<PIN, ADC1<'d>>) -> Self {
        Self { adc, pin }
    }
}

impl<PIN> AnalogInput for AdcSensor<'_, PIN>
where
    PIN: AdcChannel,
{
    async fn read(&mut self) -> i32 {
        // The conversion reports WouldBlock until it completes
        loop {
            match self.adc.read_oneshot(&mut self.pin) {
                Ok(raw) => return i32::from(raw),
                Err(_) => embassy_futures::yield_now().await,
            }
        }
    }
}

/// Milliseconds since boot from the embassy time driver, wrapping at `u32::MAX`
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        embassy_time::Instant::now().as_millis() as u32
    }
}
