use embassy_stm32::{peripherals::IWDG, wdg::IndependentWatchdog};
use embassy_time::Duration;
use pi_ano_lib::io::Watchdog;

/// The MCU's independent watchdog. Once started it cannot be stopped, only fed.
pub struct Iwdg(IndependentWatchdog<'static, IWDG>);

impl Iwdg {
    /// Starts `watchdog`; the board resets if it then goes unfed for the timeout it was created with.
    pub fn start(mut watchdog: IndependentWatchdog<'static, IWDG>) -> Self {
        watchdog.unleash();
        Self(watchdog)
    }

    /// Converts `timeout` into the microseconds [`IndependentWatchdog::new`] expects.
    pub fn timeout_us(timeout: Duration) -> u32 {
        u32::try_from(timeout.as_micros()).unwrap_or(u32::MAX)
    }
}

impl Watchdog for Iwdg {
    fn feed(&mut self) {
        self.0.pet();
    }
}
