//! Provides [`Piano`], which owns all of the instrument's musical state and decides what each key press means.

use crate::{
    io::ToneOutput,
    key_state::{KeyState, Transition, TransitionKind, Transitions},
    matrix::{KeyMap, KeyRole, Snapshot},
    octave::{OctaveController, OctaveShift},
    tone_pool::{BUZZER_COUNT, TonePool},
};

/// The state of the instrument: which keys are held, which generators they hold, and the current octave.
///
/// Nothing here is global; the control loop owns a [`Piano`] and hands it each new [`Snapshot`].
#[derive(Debug, Clone)]
pub struct Piano<const N: usize = BUZZER_COUNT> {
    key_map: KeyMap,
    keys: KeyState,
    tones: TonePool<N>,
    octave: OctaveController,
}

impl<const N: usize> Piano<N> {
    /// Constructs a [`Piano`] with no keys held.
    pub fn new(key_map: KeyMap, octave: OctaveController) -> Self {
        Self {
            key_map,
            keys: KeyState::new(),
            tones: TonePool::new(),
            octave,
        }
    }

    /// Compares `snapshot` against the held keys and acts on every change, returning the changes.
    pub fn process<T: ToneOutput>(&mut self, snapshot: &Snapshot, output: &mut T) -> Transitions {
        let transitions = self.keys.diff(snapshot);
        for &transition in &transitions {
            self.route(transition, output);
        }
        transitions
    }

    /// Silences every sounding key. Keys stay held; they will sound again only once re-pressed.
    pub fn silence<T: ToneOutput>(&mut self, output: &mut T) {
        self.tones.release_all(output);
    }

    fn route<T: ToneOutput>(&mut self, transition: Transition, output: &mut T) {
        let Transition { position, kind } = transition;
        let role = self.key_map.role(position);

        match kind {
            TransitionKind::Pressed => info!("Key {} pressed ({})", position, role),
            TransitionKind::Released => info!("Key {} released ({})", position, role),
        }

        match (kind, role) {
            (TransitionKind::Pressed, KeyRole::Note(note)) => {
                self.tones
                    .acquire(position, note, self.octave.current(), output);
            }
            (TransitionKind::Released, KeyRole::Note(_)) => {
                self.tones.release(position, output);
            }
            (TransitionKind::Pressed, KeyRole::OctaveUp) => {
                self.octave.shift(OctaveShift::Up);
            }
            (TransitionKind::Pressed, KeyRole::OctaveDown) => {
                self.octave.shift(OctaveShift::Down);
            }
            // releasing a shift key, or touching the unassigned key, only changes which keys are held
            _ => {}
        }
    }

    /// Returns the key layout.
    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    /// Returns which keys are held.
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Returns the generators and the keys they are bound to.
    pub fn tones(&self) -> &TonePool<N> {
        &self.tones
    }

    /// Returns the octave state.
    pub fn octave(&self) -> &OctaveController {
        &self.octave
    }
}

impl Default for Piano {
    fn default() -> Self {
        Self::new(KeyMap::default(), OctaveController::default())
    }
}
