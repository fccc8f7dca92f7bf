//! This module provides traits for the collaborators the control loop drives but does not own the implementation of:
//! the buzzers (via [`ToneOutput`]) and a supervising watchdog (via [`Watchdog`]), plus the [`ShutdownFlag`] through
//! which an asynchronous context asks the loop to stop.
//!
//! Reading the key matrix goes through [`embedded_hal`] traits instead; see [`crate::sampler`].

use crate::tone_pool::GeneratorId;
use core::sync::atomic::{AtomicBool, Ordering};

/// A bank of tone generators (e.g., piezo buzzers), each able to sound a single frequency at a time.
pub trait ToneOutput {
    /// Starts (or retunes) `generator` at `frequency` hertz. A frequency of 0 silences the generator.
    fn set_tone(&mut self, generator: GeneratorId, frequency: u32);

    /// Silences `generator`.
    fn stop_tone(&mut self, generator: GeneratorId) {
        self.set_tone(generator, 0);
    }
}

/// A watchdog which resets the device unless it is fed periodically.
pub trait Watchdog {
    /// Postpones the watchdog's timeout.
    fn feed(&mut self);
}

/// A flag requesting that the control loop shut down.
///
/// Only this flag is shared between the control loop and the context delivering the request (an interrupt, for
/// instance). The loop observes it once per cycle, so shutdown takes effect after at most one scan of the matrix.
#[derive(Debug, Default)]
pub struct ShutdownFlag(AtomicBool);

impl ShutdownFlag {
    /// Constructs a [`ShutdownFlag`] with no shutdown requested; usable in a `static`.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Asks the control loop to shut down. Requesting more than once has no further effect.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
