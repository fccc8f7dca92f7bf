//! The physical layout of the key matrix: where each switch sits and what pressing it means.

use crate::pitch::Note;

/// Number of rows in the key matrix, i.e., lines that are read back.
pub const ROWS: usize = 4;
/// Number of columns in the key matrix, i.e., lines that are strobed.
pub const COLUMNS: usize = 4;
/// Total number of switches in the key matrix.
pub const POSITIONS: usize = ROWS * COLUMNS;

/// Identifies one switch of the key matrix by its 0-indexed row and column.
///
/// A position can only be built through [`MatrixPosition::new`] (or [`MatrixPosition::all`]), so it always lies
/// inside the matrix and indexing by it never fails. The default is the top-left switch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixPosition {
    row: u8,
    column: u8,
}

impl MatrixPosition {
    /// Constructs a [`MatrixPosition`], returning `None` if it lies outside the matrix.
    pub const fn new(row: u8, column: u8) -> Option<Self> {
        if (row as usize) < ROWS && (column as usize) < COLUMNS {
            Some(Self { row, column })
        } else {
            None
        }
    }

    /// Iterates every position in row-major order, which is the order transitions are reported in.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..ROWS as u8).flat_map(|row| (0..COLUMNS as u8).map(move |column| Self { row, column }))
    }

    /// Returns the input line the switch closes onto.
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Returns the output line strobing the switch.
    pub const fn column(self) -> u8 {
        self.column
    }

    pub(crate) fn row_index(self) -> usize {
        usize::from(self.row)
    }

    pub(crate) fn column_index(self) -> usize {
        usize::from(self.column)
    }
}

/// What pressing a particular switch does.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyRole {
    /// Sounds a note in the current octave for as long as the key is held.
    Note(Note),
    /// Raises the octave used by subsequently pressed keys.
    OctaveUp,
    /// Lowers the octave used by subsequently pressed keys.
    OctaveDown,
    /// The switch is wired but does nothing.
    #[default]
    Unassigned,
}

/// Static assignment of a [`KeyRole`] to every [`MatrixPosition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    roles: [[KeyRole; COLUMNS]; ROWS],
}

impl KeyMap {
    /// Constructs a [`KeyMap`] from roles indexed as `roles[row][column]`.
    pub const fn new(roles: [[KeyRole; COLUMNS]; ROWS]) -> Self {
        Self { roles }
    }

    /// Returns the role of the switch at `position`.
    pub fn role(&self, position: MatrixPosition) -> KeyRole {
        self.roles[position.row_index()][position.column_index()]
    }
}

impl Default for KeyMap {
    /// The wiring of the reference build: the first two switches shift the octave, the next thirteen play C through
    /// the C above, and the last is unused.
    fn default() -> Self {
        use KeyRole::{Note as N, OctaveDown, OctaveUp, Unassigned};

        Self::new([
            [OctaveUp, OctaveDown, N(Note::C), N(Note::CSharp)],
            [N(Note::D), N(Note::DSharp), N(Note::E), N(Note::F)],
            [N(Note::FSharp), N(Note::G), N(Note::GSharp), N(Note::A)],
            [N(Note::ASharp), N(Note::B), N(Note::HighC), Unassigned],
        ])
    }
}

/// The raw state of every switch as read during one scan of the matrix; `true` means the switch is closed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    closed: [[bool; COLUMNS]; ROWS],
}

impl Snapshot {
    /// Constructs a [`Snapshot`] from switch states indexed as `closed[row][column]`.
    pub const fn new(closed: [[bool; COLUMNS]; ROWS]) -> Self {
        Self { closed }
    }

    /// Returns whether the switch at `position` was closed.
    pub fn is_closed(&self, position: MatrixPosition) -> bool {
        self.closed[position.row_index()][position.column_index()]
    }

    /// Records the state of the switch at `position`.
    pub fn set(&mut self, position: MatrixPosition, closed: bool) {
        self.closed[position.row_index()][position.column_index()] = closed;
    }

    /// Returns a copy with the switch at `position` closed.
    pub fn with_closed(mut self, position: MatrixPosition) -> Self {
        self.set(position, true);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(row: u8, column: u8) -> MatrixPosition {
        MatrixPosition::new(row, column).expect("test positions should be inside the matrix")
    }

    #[test]
    fn position_bounds() {
        let corner = position(3, 3);
        assert_eq!((3, 3), (corner.row(), corner.column()));
        assert_eq!(None, MatrixPosition::new(4, 0), "Row 4 is outside the matrix");
        assert_eq!(None, MatrixPosition::new(0, 4), "Column 4 is outside the matrix");
        assert_eq!(None, MatrixPosition::new(u8::MAX, u8::MAX));
    }

    #[test]
    fn every_position_can_index_the_matrix() {
        let key_map = KeyMap::default();
        let mut snapshot = Snapshot::default();

        // the default position and every one produced by the constructors index safely
        for position in MatrixPosition::all().chain([MatrixPosition::default()]) {
            assert!((position.row() as usize) < ROWS && (position.column() as usize) < COLUMNS);
            key_map.role(position);
            snapshot.set(position, true);
            assert!(snapshot.is_closed(position));
        }
        assert_eq!(
            MatrixPosition::all().count(),
            (0..=u8::MAX)
                .flat_map(|row| (0..=u8::MAX).map(move |column| (row, column)))
                .filter_map(|(row, column)| MatrixPosition::new(row, column))
                .count(),
            "Only positions inside the matrix can be constructed"
        );
    }

    #[test]
    fn all_is_row_major() {
        let mut positions = MatrixPosition::all();
        assert_eq!(Some(position(0, 0)), positions.next());
        assert_eq!(Some(position(0, 1)), positions.next());
        assert_eq!(
            Some(position(3, 3)),
            MatrixPosition::all().last()
        );
        assert_eq!(POSITIONS, MatrixPosition::all().count());
    }

    #[test]
    fn reference_layout() {
        let key_map = KeyMap::default();
        let roles = || MatrixPosition::all().map(|position| key_map.role(position));

        assert_eq!(13, roles().filter(|role| matches!(role, KeyRole::Note(_))).count());
        assert_eq!(1, roles().filter(|&role| role == KeyRole::OctaveUp).count());
        assert_eq!(1, roles().filter(|&role| role == KeyRole::OctaveDown).count());
        assert_eq!(1, roles().filter(|&role| role == KeyRole::Unassigned).count());

        // notes ascend in scan order
        let notes = roles().filter_map(|role| match role {
            KeyRole::Note(note) => Some(note.index()),
            _ => None,
        });
        assert!(notes.eq(0..=12), "Notes should run C through HighC in scan order");
    }

    #[test]
    fn snapshot_set_and_read() {
        let key = position(2, 1);
        let snapshot = Snapshot::default().with_closed(key);

        assert!(snapshot.is_closed(key));
        assert_eq!(
            1,
            MatrixPosition::all().filter(|&p| snapshot.is_closed(p)).count(),
            "Only one switch should be closed"
        );
    }
}
