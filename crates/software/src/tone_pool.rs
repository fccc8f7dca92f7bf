//! Provides [`TonePool`], which hands out the instrument's few tone generators to the keys being played.
//!
//! Generators are allocated first come, first served: when every generator is busy, further presses still count as
//! held keys but make no sound. Nothing is stolen and nothing is queued, so a key pressed while the pool is full
//! stays silent even if a generator frees up before it is released.

use crate::{
    io::ToneOutput,
    matrix::MatrixPosition,
    pitch::{self, Note, Octave},
};

/// Number of buzzers on the reference build.
pub const BUZZER_COUNT: usize = 4;

/// Identifies one tone generator; generators are numbered from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneratorId(u8);

impl GeneratorId {
    /// Constructs a [`GeneratorId`].
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Returns the index of the generator.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A key which is both held and sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveTone {
    /// The key holding the generator.
    pub position: MatrixPosition,
    /// The generator sounding the key.
    pub generator: GeneratorId,
    /// The frequency, in hertz, the generator was started at.
    pub frequency: u32,
}

/// A fixed set of `N` tone generator slots, each either free or bound to one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TonePool<const N: usize = BUZZER_COUNT> {
    slots: [Option<ActiveTone>; N],
}

impl<const N: usize> Default for TonePool<N> {
    fn default() -> Self {
        Self { slots: [None; N] }
    }
}

impl<const N: usize> TonePool<N> {
    /// Constructs a [`TonePool`] with every slot free.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the first free generator to the key at `position` and starts it sounding `note` in `octave`.
    ///
    /// Returns `None` when every generator is busy; the press is simply not voiced. A key which already holds a
    /// generator keeps it and nothing new is started.
    pub fn acquire<T: ToneOutput>(
        &mut self,
        position: MatrixPosition,
        note: Note,
        octave: Octave,
        output: &mut T,
    ) -> Option<GeneratorId> {
        if let Some(generator) = self.generator_of(position) {
            warn!("{} already sounds on generator {}", position, generator);
            return Some(generator);
        }

        let Some((index, slot)) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
        else {
            debug!(
                "All {} generators are busy; {} will not sound",
                N,
                note.in_octave(octave).to_str()
            );
            return None;
        };

        let tone = ActiveTone {
            position,
            generator: GeneratorId::new(index as u8),
            frequency: pitch::frequency(note, octave),
        };
        output.set_tone(tone.generator, tone.frequency);
        *slot = Some(tone);
        info!(
            "Playing {} ({} Hz) on generator {}",
            note.in_octave(octave).to_str(),
            tone.frequency,
            tone.generator
        );

        Some(tone.generator)
    }

    /// Silences and frees the generator bound to the key at `position`, returning it.
    ///
    /// Returns `None` without touching the output when the key holds no generator, e.g., because it was pressed
    /// while the pool was full.
    pub fn release<T: ToneOutput>(
        &mut self,
        position: MatrixPosition,
        output: &mut T,
    ) -> Option<GeneratorId> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_some_and(|tone| tone.position == position))?;
        let tone = slot.take()?;

        output.stop_tone(tone.generator);
        info!("Stopped generator {}", tone.generator);

        Some(tone.generator)
    }

    /// Silences and frees every bound generator.
    pub fn release_all<T: ToneOutput>(&mut self, output: &mut T) {
        for tone in self.slots.iter_mut().filter_map(Option::take) {
            output.stop_tone(tone.generator);
            info!("Stopped generator {}", tone.generator);
        }
    }

    /// Returns the generator bound to the key at `position`, if any.
    pub fn generator_of(&self, position: MatrixPosition) -> Option<GeneratorId> {
        self.active_tones()
            .find(|tone| tone.position == position)
            .map(|tone| tone.generator)
    }

    /// Iterates the tones currently sounding, in generator order.
    pub fn active_tones(&self) -> impl Iterator<Item = &ActiveTone> {
        self.slots.iter().flatten()
    }

    /// Returns the number of bound generators.
    pub fn bound_count(&self) -> usize {
        self.active_tones().count()
    }

    /// Returns the total number of generators.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns `true` when no generator is free.
    pub fn is_saturated(&self) -> bool {
        self.bound_count() == N
    }
}
