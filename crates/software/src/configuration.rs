//! This module contains the user-configurable settings and the parser for their plain-text format:
//!
//! ```text
//! # comments start with a hash
//! initialOctave: 4
//! watchDogTimer: 10
//! ```
//!
//! Parsing never fails. Values which are missing, malformed, or out of range are replaced with documented defaults
//! and a warning is logged, because a typo in a settings file should not keep the instrument from playing.

use crate::{octave::DEFAULT_MAX_OCTAVE, pitch::Octave};
use core::{fmt, ops::RangeInclusive};
use embassy_time::Duration;

const INITIAL_OCTAVE_KEY: &str = "initialOctave";
const WATCHDOG_TIMER_KEY: &str = "watchDogTimer";
/// Accepted for compatibility with older settings files; logs are never written to a file.
const LOG_FILE_KEY: &str = "logFileLocation";

/// Octave used when none (or an invalid one) is configured.
pub const DEFAULT_INITIAL_OCTAVE: Octave = Octave::REFERENCE;
/// Watchdog timeout, in seconds, used when none (or an invalid one) is configured.
pub const DEFAULT_WATCHDOG_SECS: u8 = 10;
/// The range of watchdog timeouts, in seconds, which may be configured.
pub const WATCHDOG_SECS_RANGE: RangeInclusive<u8> = 1..=15;

/// Settings read at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// The octave notes are played in until a shift key is pressed; 1 through [`DEFAULT_MAX_OCTAVE`].
    pub initial_octave: Octave,
    /// How long the device may go without feeding the watchdog before it resets.
    pub watchdog_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_octave: DEFAULT_INITIAL_OCTAVE,
            watchdog_timeout: Duration::from_secs(DEFAULT_WATCHDOG_SECS as u64),
        }
    }
}

impl Settings {
    /// Parses settings from `text`, falling back to the defaults for anything missing or invalid.
    ///
    /// Blank lines and lines starting with `#` are skipped. Every other line is expected to be `key: value`; keys are
    /// case-sensitive, unknown keys are ignored, and when a key appears twice the later value wins.
    pub fn parse(text: &str) -> Self {
        let mut initial_octave = None;
        let mut watchdog_secs = None;

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                warn!("Ignoring settings line without a colon: {}", line);
                continue;
            };
            let value = value.trim();

            match key.trim() {
                INITIAL_OCTAVE_KEY => initial_octave = Some(value.parse::<u8>().ok()),
                WATCHDOG_TIMER_KEY => watchdog_secs = Some(value.parse::<u8>().ok()),
                LOG_FILE_KEY => debug!("Ignoring {}; logs go to the debug probe", LOG_FILE_KEY),
                unknown => warn!("Ignoring unknown setting {}", unknown),
            }
        }

        let initial_octave = match initial_octave {
            Some(Some(number)) if (1..=DEFAULT_MAX_OCTAVE.get()).contains(&number) => {
                Octave::new(number).unwrap_or(DEFAULT_INITIAL_OCTAVE)
            }
            Some(_) => {
                warn!(
                    "Invalid {} (expected 1-{}); using default {}",
                    INITIAL_OCTAVE_KEY,
                    DEFAULT_MAX_OCTAVE.get(),
                    DEFAULT_INITIAL_OCTAVE.get()
                );
                DEFAULT_INITIAL_OCTAVE
            }
            None => {
                warn!(
                    "Missing {}; using default {}",
                    INITIAL_OCTAVE_KEY,
                    DEFAULT_INITIAL_OCTAVE.get()
                );
                DEFAULT_INITIAL_OCTAVE
            }
        };

        let watchdog_secs = match watchdog_secs {
            Some(Some(secs)) if WATCHDOG_SECS_RANGE.contains(&secs) => secs,
            Some(_) => {
                warn!(
                    "Invalid {} (expected {}-{} seconds); using default {}",
                    WATCHDOG_TIMER_KEY,
                    WATCHDOG_SECS_RANGE.start(),
                    WATCHDOG_SECS_RANGE.end(),
                    DEFAULT_WATCHDOG_SECS
                );
                DEFAULT_WATCHDOG_SECS
            }
            None => {
                warn!(
                    "Missing {}; using default {}",
                    WATCHDOG_TIMER_KEY, DEFAULT_WATCHDOG_SECS
                );
                DEFAULT_WATCHDOG_SECS
            }
        };

        Self {
            initial_octave,
            watchdog_timeout: Duration::from_secs(watchdog_secs as u64),
        }
    }
}

/// Renders the settings in the format [`Settings::parse`] reads, comments included, e.g., to produce a fresh
/// settings file.
impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# The starting octave (1-{}) and the watchdog timeout ({}-{} seconds).",
            DEFAULT_MAX_OCTAVE.get(),
            WATCHDOG_SECS_RANGE.start(),
            WATCHDOG_SECS_RANGE.end()
        )?;
        writeln!(f, "{}: {}", INITIAL_OCTAVE_KEY, self.initial_octave.get())?;
        writeln!(
            f,
            "{}: {}",
            WATCHDOG_TIMER_KEY,
            self.watchdog_timeout.as_secs()
        )
    }
}
