//! Pi-ano is [Embassy](https://embassy.dev)-based firmware for a tiny polyphonic piano running on the
//! [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html).
//!
//! Sixteen switches wired as a 4x4 matrix make up the keyboard: thirteen chromatic keys from C to the C above, two keys
//! which shift the octave, and one spare. Up to four keys sound at once, each on its own piezo buzzer driven by a PWM
//! timer. The board's user button shuts the instrument down.
//!
//! The control loop itself lives in `pi_ano_lib`; this crate only wires it to the board.

#![no_std]
#![no_main]

mod buzzer;
mod shutdown;
mod watchdog;

use crate::{
    buzzer::{Buzzer, Buzzers, TimerBuzzer},
    shutdown::{SHUTDOWN, shutdown_button_task},
    watchdog::Iwdg,
};
use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::InterruptExecutor;
use embassy_stm32::{
    Config,
    exti::ExtiInput,
    gpio::{Input, Level, Output, OutputType, Pull, Speed},
    interrupt::{self, InterruptExt, Priority},
    time::Hertz,
    timer::{
        low_level::CountingMode,
        simple_pwm::{PwmPin, SimplePwm},
    },
    wdg::IndependentWatchdog,
};
use embassy_time::{Delay, block_for};
use pi_ano_lib::{
    PROGRAM_NAME,
    configuration::Settings,
    control::{ControlLoop, KeepAlive},
    io::Watchdog as _,
    matrix::KeyMap,
    octave::{DEFAULT_MAX_OCTAVE, OctaveController},
    piano::Piano,
    sampler::MatrixSampler,
    tone_pool::BUZZER_COUNT,
};

use defmt_rtt as _;
#[cfg(not(feature = "debug"))]
use panic_halt as _;
#[cfg(feature = "debug")]
use panic_probe as _;

/// Settings compiled into the firmware; there is no file system to read them from at runtime.
const SETTINGS: &str = include_str!("../pi_ano.cfg");

/// The buzzer timers need some frequency to start out at; they stay silent until a key is played.
const IDLE_FREQUENCY: Hertz = Hertz(440);

/// Runs the shutdown button task, preempting the control loop which blocks thread mode.
static SHUTDOWN_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

// UART4 is otherwise unused, so its interrupt is borrowed to drive the executor
#[embassy_stm32::interrupt]
unsafe fn UART4() {
    unsafe { SHUTDOWN_EXECUTOR.on_interrupt() }
}

#[entry]
fn main() -> ! {
    info!("Initializing {}", PROGRAM_NAME);

    let settings = Settings::parse(SETTINGS);
    info!("Loaded settings: {}", settings);

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock, supplied by the on-board ST-LINK
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            divq: None,
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
    }
    let p = embassy_stm32::init(config);

    // strobe lines; a column is driven high only while one of its switches is being read
    let columns = [
        Output::new(p.PF13, Level::Low, Speed::Low),
        Output::new(p.PE9, Level::Low, Speed::Low),
        Output::new(p.PE11, Level::Low, Speed::Low),
        Output::new(p.PF14, Level::Low, Speed::Low),
    ];
    // sense lines; pulled down so an open switch reads low
    let rows = [
        Input::new(p.PE13, Pull::Down),
        Input::new(p.PF15, Pull::Down),
        Input::new(p.PG14, Pull::Down),
        Input::new(p.PG9, Pull::Down),
    ];
    let sampler = MatrixSampler::new(columns, rows, Delay);

    // each buzzer sits on channel 1 of its own timer so that all four can play different notes
    let buzzers = Buzzers([
        Buzzer::from(TimerBuzzer::new(SimplePwm::new(
            p.TIM2,
            Some(PwmPin::new(p.PA15, OutputType::PushPull)),
            None,
            None,
            None,
            IDLE_FREQUENCY,
            CountingMode::EdgeAlignedUp,
        ))),
        Buzzer::from(TimerBuzzer::new(SimplePwm::new(
            p.TIM3,
            Some(PwmPin::new(p.PB4, OutputType::PushPull)),
            None,
            None,
            None,
            IDLE_FREQUENCY,
            CountingMode::EdgeAlignedUp,
        ))),
        Buzzer::from(TimerBuzzer::new(SimplePwm::new(
            p.TIM4,
            Some(PwmPin::new(p.PD12, OutputType::PushPull)),
            None,
            None,
            None,
            IDLE_FREQUENCY,
            CountingMode::EdgeAlignedUp,
        ))),
        Buzzer::from(TimerBuzzer::new(SimplePwm::new(
            p.TIM5,
            Some(PwmPin::new(p.PA0, OutputType::PushPull)),
            None,
            None,
            None,
            IDLE_FREQUENCY,
            CountingMode::EdgeAlignedUp,
        ))),
    ]);

    let watchdog = Iwdg::start(IndependentWatchdog::new(
        p.IWDG,
        Iwdg::timeout_us(settings.watchdog_timeout),
    ));
    let keep_alive = KeepAlive::new(watchdog, settings.watchdog_timeout);

    interrupt::UART4.set_priority(Priority::P6);
    let spawner = SHUTDOWN_EXECUTOR.start(interrupt::UART4);
    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(shutdown_button_task(button, &SHUTDOWN)));

    let piano = Piano::<BUZZER_COUNT>::new(
        KeyMap::default(),
        OctaveController::new(settings.initial_octave, DEFAULT_MAX_OCTAVE),
    );
    let mut control = ControlLoop::new(sampler, piano, buzzers, Some(keep_alive));

    info!("{} launched", PROGRAM_NAME);
    if let Err(error) = control.run(&SHUTDOWN) {
        error!("{} stopped after a pin error: {}", PROGRAM_NAME, error);
    }
    info!("{} shut down", PROGRAM_NAME);

    // the independent watchdog cannot be stopped once started, so keep feeding it rather than let it reset the board
    let keep_alive = unwrap!(control.keep_alive_mut());
    let period = keep_alive.period();
    loop {
        keep_alive.watchdog_mut().feed();
        block_for(period);
    }
}
