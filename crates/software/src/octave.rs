//! Provides [`OctaveController`], the octave counter driven by the two octave shift keys.

use crate::pitch::Octave;

/// The highest octave reachable with the shift keys on the reference build.
pub const DEFAULT_MAX_OCTAVE: Octave = match Octave::new(4) {
    Some(octave) => octave,
    None => panic!("4 is a valid octave"),
};

/// Direction of an octave shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OctaveShift {
    /// One octave up.
    Up,
    /// One octave down.
    Down,
}

/// Holds the octave new notes are played in, clamped to [`Octave::LOWEST`] through a configurable maximum.
///
/// Shifting changes only the notes started afterwards; tones already sounding keep their pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctaveController {
    current: Octave,
    max: Octave,
}

impl OctaveController {
    /// Constructs an [`OctaveController`] starting at `initial`, clamped to the `max` octave.
    pub fn new(initial: Octave, max: Octave) -> Self {
        Self {
            current: initial.min(max),
            max,
        }
    }

    /// Returns the octave new notes are played in.
    pub fn current(&self) -> Octave {
        self.current
    }

    /// Returns the highest octave the controller can reach.
    pub fn max(&self) -> Octave {
        self.max
    }

    /// Shifts the octave one step in `direction`, returning the new octave.
    ///
    /// Returns `None` when already at the end of the range; this is not an error.
    pub fn shift(&mut self, direction: OctaveShift) -> Option<Octave> {
        let shifted = match direction {
            OctaveShift::Up => self.current.up().filter(|&octave| octave <= self.max),
            OctaveShift::Down => self.current.down(),
        }?;
        self.current = shifted;
        info!("Octave changed to {}", shifted.get());

        Some(shifted)
    }
}

impl Default for OctaveController {
    fn default() -> Self {
        Self::new(Octave::REFERENCE, DEFAULT_MAX_OCTAVE)
    }
}
