//! The control loop: scan the matrix, act on what changed, keep the watchdog fed, repeat until told to stop.

use crate::{
    PROGRAM_NAME,
    io::{ShutdownFlag, ToneOutput, Watchdog},
    key_state::Transitions,
    piano::Piano,
    sampler::MatrixSampler,
    tone_pool::BUZZER_COUNT,
};
use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, InputPin, OutputPin},
};

/// Phases of the [`ControlLoop`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Scanning and playing.
    #[default]
    Running,
    /// Shutdown was requested (or scanning failed); every tone has been silenced.
    ShuttingDown,
}

/// Feeds a [`Watchdog`] based on time spent scanning rather than a clock.
///
/// Scans are the only thing the loop waits on, so the time they spend settling is a close enough measure of elapsed
/// time. The watchdog is fed once half of its timeout has accumulated.
#[derive(Debug)]
pub struct KeepAlive<W> {
    watchdog: W,
    period: Duration,
    elapsed: Duration,
}

impl<W: Watchdog> KeepAlive<W> {
    /// Constructs a [`KeepAlive`] for a watchdog that resets the device after `timeout`.
    pub fn new(watchdog: W, timeout: Duration) -> Self {
        Self {
            watchdog,
            period: timeout / 2,
            elapsed: Duration::from_ticks(0),
        }
    }

    /// Records that `elapsed` has passed, feeding the watchdog if it is due. Returns `true` if it was fed.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.elapsed += elapsed;
        if self.elapsed < self.period {
            return false;
        }
        self.watchdog.feed();
        self.elapsed = Duration::from_ticks(0);
        debug!("Watchdog fed");
        true
    }

    /// Returns the interval between feedings.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Gives direct access to the watchdog, e.g., to keep feeding it once the loop has ended.
    pub fn watchdog_mut(&mut self) -> &mut W {
        &mut self.watchdog
    }
}

/// Owns everything the instrument needs and drives it one scan at a time.
pub struct ControlLoop<O, I, D, T, W, const N: usize = BUZZER_COUNT> {
    sampler: MatrixSampler<O, I, D>,
    piano: Piano<N>,
    output: T,
    keep_alive: Option<KeepAlive<W>>,
    state: LoopState,
}

impl<O, I, D, T, W, const N: usize> ControlLoop<O, I, D, T, W, N>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    T: ToneOutput,
    W: Watchdog,
{
    /// Constructs a [`ControlLoop`] in the [`LoopState::Running`] state.
    pub fn new(
        sampler: MatrixSampler<O, I, D>,
        piano: Piano<N>,
        output: T,
        keep_alive: Option<KeepAlive<W>>,
    ) -> Self {
        Self {
            sampler,
            piano,
            output,
            keep_alive,
            state: LoopState::Running,
        }
    }

    /// Scans the matrix once, acts on every change, and feeds the watchdog if due.
    pub fn cycle(&mut self) -> Result<Transitions, ErrorKind> {
        let snapshot = self.sampler.sample()?;
        let transitions = self.piano.process(&snapshot, &mut self.output);

        if let Some(keep_alive) = self.keep_alive.as_mut() {
            keep_alive.tick(self.sampler.scan_duration());
        }
        Ok(transitions)
    }

    /// Cycles until `shutdown` is requested, then silences every tone and returns.
    ///
    /// The flag is checked before each scan, so a request made mid-scan takes effect once that scan has been
    /// processed. A pin error also ends the loop, after silencing, and is returned.
    pub fn run(&mut self, shutdown: &ShutdownFlag) -> Result<(), ErrorKind> {
        info!("{} running", PROGRAM_NAME);

        let outcome = loop {
            if shutdown.is_requested() {
                break Ok(());
            }
            if let Err(error) = self.cycle() {
                error!("Scanning the key matrix failed: {}", error);
                break Err(error);
            }
        };

        self.state = LoopState::ShuttingDown;
        info!("{} shutting down", PROGRAM_NAME);
        self.piano.silence(&mut self.output);

        outcome
    }

    /// Returns the phase the loop is in.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns the instrument state.
    pub fn piano(&self) -> &Piano<N> {
        &self.piano
    }

    /// Returns the tone output.
    pub fn output(&self) -> &T {
        &self.output
    }

    /// Returns the watchdog keep-alive, if the loop was given one.
    pub fn keep_alive_mut(&mut self) -> Option<&mut KeepAlive<W>> {
        self.keep_alive.as_mut()
    }
}
