//! Drives the piezo buzzers, one PWM timer per buzzer.
//!
//! Each timer has a different type, so the buzzers are gathered behind [`Buzzer`], which forwards to whichever timer
//! it wraps.

use defmt::warn;
use embassy_stm32::{
    peripherals::{TIM2, TIM3, TIM4, TIM5},
    time::Hertz,
    timer::{GeneralInstance4Channel, simple_pwm::SimplePwm},
};
use enum_dispatch::enum_dispatch;
use pi_ano_lib::{
    io::ToneOutput,
    tone_pool::{BUZZER_COUNT, GeneratorId},
};

/// A square wave at 50 % duty is as loud as a piezo gets.
const DUTY_PERCENT: u8 = 50;

/// A single buzzer able to sound one frequency at a time.
#[enum_dispatch(Buzzer)]
pub trait Buzz {
    /// Starts, or retunes, the buzzer.
    fn start(&mut self, frequency: Hertz);
    /// Silences the buzzer, keeping its timer configured.
    fn stop(&mut self);
}

/// A buzzer wired to channel 1 of a general purpose timer.
pub struct TimerBuzzer<'d, T: GeneralInstance4Channel> {
    pwm: SimplePwm<'d, T>,
}

impl<'d, T: GeneralInstance4Channel> TimerBuzzer<'d, T> {
    /// Wraps `pwm`, making sure the buzzer starts out silent.
    pub fn new(mut pwm: SimplePwm<'d, T>) -> Self {
        pwm.ch1().disable();
        Self { pwm }
    }
}

impl<T: GeneralInstance4Channel> Buzz for TimerBuzzer<'_, T> {
    fn start(&mut self, frequency: Hertz) {
        // changing the frequency changes the counter period, so the duty cycle is set afterwards
        self.pwm.set_frequency(frequency);
        let mut channel = self.pwm.ch1();
        channel.set_duty_cycle_percent(DUTY_PERCENT);
        channel.enable();
    }

    fn stop(&mut self) {
        self.pwm.ch1().disable();
    }
}

/// One of the four buzzers, whichever timer it sits on.
#[enum_dispatch]
pub enum Buzzer {
    Tim2(TimerBuzzer<'static, TIM2>),
    Tim3(TimerBuzzer<'static, TIM3>),
    Tim4(TimerBuzzer<'static, TIM4>),
    Tim5(TimerBuzzer<'static, TIM5>),
}

/// The buzzers, indexed by [`GeneratorId`].
pub struct Buzzers(pub [Buzzer; BUZZER_COUNT]);

impl ToneOutput for Buzzers {
    fn set_tone(&mut self, generator: GeneratorId, frequency: u32) {
        let Some(buzzer) = self.0.get_mut(generator.index()) else {
            warn!("No buzzer for generator {}", generator);
            return;
        };
        match frequency {
            // a timer cannot run at 0 Hz
            0 => buzzer.stop(),
            frequency => buzzer.start(Hertz(frequency)),
        }
    }
}
