//! Provides [`KeyState`], the authoritative record of which keys are held, and the [`Transition`]s produced by
//! comparing it against each fresh [`Snapshot`].
//!
//! There is no debouncing beyond edge detection: a single noisy read registers as a press (or release), which the
//! next scan then undoes.

use crate::matrix::{COLUMNS, MatrixPosition, POSITIONS, ROWS, Snapshot};
use tinyvec::ArrayVec;

/// Whether a key went down or came up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransitionKind {
    /// The switch closed since the last scan.
    #[default]
    Pressed,
    /// The switch opened since the last scan.
    Released,
}

/// A change in the held state of a single key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// The key which changed.
    pub position: MatrixPosition,
    /// How it changed.
    pub kind: TransitionKind,
}

impl Transition {
    /// Constructs a press of the key at `position`.
    pub fn pressed(position: MatrixPosition) -> Self {
        Self {
            position,
            kind: TransitionKind::Pressed,
        }
    }

    /// Constructs a release of the key at `position`.
    pub fn released(position: MatrixPosition) -> Self {
        Self {
            position,
            kind: TransitionKind::Released,
        }
    }
}

/// The transitions found in one scan. Every key changes at most once per scan, so this never overflows.
pub type Transitions = ArrayVec<[Transition; POSITIONS]>;

/// Which keys are currently considered held.
///
/// A key is held if and only if the most recent [`Transition`] reported for it was a press.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyState {
    held: [[bool; COLUMNS]; ROWS],
}

impl KeyState {
    /// Constructs a [`KeyState`] with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the held state in line with `snapshot`, returning what changed in row-major order.
    ///
    /// Keys which stayed down or stayed up produce nothing, so passing the same snapshot twice in a row yields no
    /// transitions the second time.
    pub fn diff(&mut self, snapshot: &Snapshot) -> Transitions {
        let mut transitions = Transitions::new();
        for position in MatrixPosition::all() {
            let held = &mut self.held[position.row_index()][position.column_index()];
            match (*held, snapshot.is_closed(position)) {
                (false, true) => {
                    *held = true;
                    transitions.push(Transition::pressed(position));
                }
                (true, false) => {
                    *held = false;
                    transitions.push(Transition::released(position));
                }
                _ => {}
            }
        }
        transitions
    }

    /// Returns whether the key at `position` is held.
    pub fn is_held(&self, position: MatrixPosition) -> bool {
        self.held[position.row_index()][position.column_index()]
    }

    /// Returns the number of keys held.
    pub fn held_count(&self) -> usize {
        self.held.iter().flatten().filter(|&&held| held).count()
    }
}
