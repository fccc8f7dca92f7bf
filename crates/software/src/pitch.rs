//! Musical notes, octaves, and the equal-tempered frequencies they produce.

use measurements::Frequency;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// Concert pitch: the frequency of [`Note::A`] in the [reference octave](`Octave::REFERENCE`).
pub const REFERENCE_PITCH_HZ: f64 = 440.0;

/// The thirteen keys of the instrument, spanning C to the C an octave above.
///
/// The discriminant doubles as the key's semitone index within the octave (0 through 12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Note {
    /// Index 0.
    C,
    /// Index 1.
    CSharp,
    /// Index 2.
    D,
    /// Index 3.
    DSharp,
    /// Index 4.
    E,
    /// Index 5.
    F,
    /// Index 6.
    FSharp,
    /// Index 7.
    G,
    /// Index 8.
    GSharp,
    /// Index 9; the reference note.
    A,
    /// Index 10.
    ASharp,
    /// Index 11.
    B,
    /// Index 12, i.e., the C of the next octave up.
    HighC,
}

impl Note {
    /// The note tuned to [`REFERENCE_PITCH_HZ`].
    pub const REFERENCE: Note = Note::A;

    /// Returns the semitone index of the note, 0 for [`Note::C`] up to 12 for [`Note::HighC`].
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a note by its semitone index; `None` outside 0 through 12.
    pub fn from_index(index: u8) -> Option<Self> {
        <Self as FromPrimitive>::from_u8(index)
    }

    /// Expresses this key, played in `octave`, as a MIDI note (e.g., [`Note::A`] in octave 4 is `A4`).
    ///
    /// Mostly useful for readable log output via [`wmidi::Note::to_str`].
    pub fn in_octave(self, octave: Octave) -> wmidi::Note {
        // MIDI numbers C-1 as 0, so octave N starts at 12 * (N + 1)
        wmidi::Note::from_u8_lossy(12 * (octave.get() + 1) + self.index())
    }
}

/// An octave number in the audible window of the buzzers, 1 through 7 (roughly 33 Hz to 4.2 kHz).
///
/// Constructing an [`Octave`] is the only place the range is checked, which keeps [`frequency`] total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Octave(u8);

impl Octave {
    /// The lowest octave the calculator accepts.
    pub const LOWEST: Octave = Octave(1);
    /// The highest octave the calculator accepts.
    pub const HIGHEST: Octave = Octave(7);
    /// The octave containing [`Note::REFERENCE`] at [`REFERENCE_PITCH_HZ`], i.e., A4.
    pub const REFERENCE: Octave = Octave(4);

    /// Constructs an [`Octave`], returning `None` when `number` lies outside [`LOWEST`](Self::LOWEST) through
    /// [`HIGHEST`](Self::HIGHEST).
    pub const fn new(number: u8) -> Option<Self> {
        if number >= Self::LOWEST.0 && number <= Self::HIGHEST.0 {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Returns the octave number.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The next octave up, if any.
    pub fn up(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// The next octave down, if any.
    pub fn down(self) -> Option<Self> {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for Octave {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Returns the exact equal-tempered pitch of `note` played in `octave`.
pub fn pitch(note: Note, octave: Octave) -> Frequency {
    let semitones = f64::from(note.index()) - f64::from(Note::REFERENCE.index());
    let octaves = f64::from(octave.get()) - f64::from(Octave::REFERENCE.get());

    Frequency::from_hertz(REFERENCE_PITCH_HZ * libm::exp2(semitones / 12.0) * libm::exp2(octaves))
}

/// Returns the frequency, in whole hertz, a buzzer should sound for `note` played in `octave`.
///
/// Rounds half up, matching published pitch tables (e.g., C4 is 262 Hz, not 261).
pub fn frequency(note: Note, octave: Octave) -> u32 {
    // the pitch is always positive, so truncating after adding one half rounds to nearest
    (pitch(note, octave).as_hertz() + 0.5) as u32
}
