//! Sensor sampling
//!
//! A single ADC conversion is noisy, so each trigger takes a burst of samples
//! spaced by a fixed interval and reports their truncated integer mean.

use core::future::Future;
use core::num::NonZeroU16;

use embedded_hal_async::delay::DelayNs;

/// Port for reading raw analog samples
///
/// Reads cannot fail at this layer; the adapter owns any retry needed to get a
/// conversion out of the hardware.
pub trait AnalogInput {
    /// Take one raw sample
    fn read(&mut self) -> impl Future<Output = i32>;
}

/// Average `count` consecutive samples from `input`.
///
/// Waits `interval_ms` between two reads (not after the last one), so a call
/// blocks for `(count - 1) * interval_ms`. The mean uses integer division and
/// truncates toward zero.
pub async fn average<A, D>(input: &mut A, delay: &mut D, count: NonZeroU16, interval_ms: u32) -> i32
where
    A: AnalogInput,
    D: DelayNs,
{
    let count = count.get();
    let mut sum: i64 = 0;

    for n in 0..count {
        if n > 0 {
            delay.delay_ms(interval_ms).await;
        }
        sum += i64::from(input.read().await);
    }

    // The mean of i32 samples always fits in i32
    (sum / i64::from(count)) as i32
}
