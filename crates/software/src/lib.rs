//! This crate contains architecture-agnostic logic for pi_ano, a device which turns a 4x4 matrix of push buttons and
//! four piezo buzzers into a tiny piano: thirteen keys spanning C to C, two keys shifting the octave, and up to four
//! notes sounding at once.
//!
//! Hardware is reached only through [`embedded-hal`](https://docs.rs/embedded-hal) traits and the small collaborator
//! traits in [`io`], so everything here can be exercised on a host machine.

#![deny(missing_docs)]
#![no_std]

// must stay first so the logging macros are visible to the modules below
mod fmt;

#[cfg(test)]
mod mock;

pub mod configuration;
pub mod control;
pub mod io;
pub mod key_state;
pub mod matrix;
pub mod octave;
pub mod piano;
pub mod pitch;
pub mod sampler;
pub mod tone_pool;

/// Name used to tag log lines emitted at startup and shutdown.
pub const PROGRAM_NAME: &str = "pi_ano";
