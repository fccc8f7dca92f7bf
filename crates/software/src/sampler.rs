//! Reads the key matrix one switch at a time.
//!
//! Each column line is an output and each row line an input. To read a switch, its column is driven high, the lines
//! are given a moment to settle, the row is read, and the column is driven low again. Reading too quickly after the
//! strobe returns stale values, so a full scan takes [`POSITIONS`] times the settle delay (48 ms by default).

use crate::matrix::{COLUMNS, MatrixPosition, POSITIONS, ROWS, Snapshot};
use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, ErrorKind, InputPin, OutputPin},
};

/// How long to wait between strobing a column and reading a row.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(3);

/// Owns the pins of the key matrix and produces [`Snapshot`]s of it.
pub struct MatrixSampler<O, I, D> {
    columns: [O; COLUMNS],
    rows: [I; ROWS],
    delay: D,
    settle: Duration,
}

impl<O: OutputPin, I: InputPin, D: DelayNs> MatrixSampler<O, I, D> {
    /// Constructs a [`MatrixSampler`] using the [`DEFAULT_SETTLE`] delay.
    ///
    /// Column pins are expected to start out low.
    pub fn new(columns: [O; COLUMNS], rows: [I; ROWS], delay: D) -> Self {
        Self {
            columns,
            rows,
            delay,
            settle: DEFAULT_SETTLE,
        }
    }

    /// Replaces the settle delay.
    pub fn with_settle(self, settle: Duration) -> Self {
        Self { settle, ..self }
    }

    /// Returns the settle delay.
    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Returns how long one full scan spends waiting for the lines to settle.
    pub fn scan_duration(&self) -> Duration {
        self.settle * POSITIONS as u32
    }

    /// Starts a scan of the matrix, lazily reading one switch per call to [`Iterator::next`].
    ///
    /// Switches are visited column by column, following the strobe lines. Every call begins a fresh scan.
    pub fn scan(&mut self) -> Scan<'_, O, I, D> {
        Scan {
            sampler: self,
            next: 0,
        }
    }

    /// Reads every switch, returning the result as a [`Snapshot`].
    ///
    /// Stops at the first pin error; the offending column is still driven low before returning.
    pub fn sample(&mut self) -> Result<Snapshot, ErrorKind> {
        let mut snapshot = Snapshot::default();
        for (position, closed) in self.scan() {
            snapshot.set(position, closed?);
        }
        Ok(snapshot)
    }

    fn read(&mut self, position: MatrixPosition) -> Result<bool, ErrorKind> {
        let settle_us = u32::try_from(self.settle.as_micros()).unwrap_or(u32::MAX);
        let column = &mut self.columns[position.column_index()];

        column.set_high().map_err(|e| e.kind())?;
        self.delay.delay_us(settle_us);
        let closed = self.rows[position.row_index()]
            .is_high()
            .map_err(|e| e.kind());
        // the strobe must come down even when the read failed, or every later read on this row would see it
        let released = column.set_low().map_err(|e| e.kind());

        let closed = closed?;
        released?;
        Ok(closed)
    }
}

/// A single pass over the key matrix; see [`MatrixSampler::scan`].
pub struct Scan<'a, O, I, D> {
    sampler: &'a mut MatrixSampler<O, I, D>,
    next: usize,
}

impl<O: OutputPin, I: InputPin, D: DelayNs> Iterator for Scan<'_, O, I, D> {
    type Item = (MatrixPosition, Result<bool, ErrorKind>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= POSITIONS {
            return None;
        }
        let position = MatrixPosition::new((self.next % ROWS) as u8, (self.next / ROWS) as u8)?;
        self.next += 1;

        Some((position, self.sampler.read(position)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = POSITIONS - self.next;
        (remaining, Some(remaining))
    }
}

impl<O: OutputPin, I: InputPin, D: DelayNs> ExactSizeIterator for Scan<'_, O, I, D> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, PinEvent};
    extern crate std;
    use std::vec::Vec;

    #[test]
    fn sample_reads_closed_switches() {
        let (board, mut sampler) = mock::matrix();
        let pressed = [mock::position(0, 2), mock::position(3, 1)];
        board.borrow_mut().closed = pressed
            .iter()
            .fold(Snapshot::default(), |snapshot, &position| {
                snapshot.with_closed(position)
            });

        let snapshot = sampler.sample().expect("fake pins never fail");

        for position in MatrixPosition::all() {
            assert_eq!(
                pressed.contains(&position),
                snapshot.is_closed(position),
                "Unexpected state at {:?}",
                position
            );
        }
    }

    #[test]
    fn strobes_each_switch_in_turn() {
        let (board, mut sampler) = mock::matrix();
        sampler.sample().expect("fake pins never fail");

        let events = &board.borrow().events;
        assert_eq!(POSITIONS * 4, events.len(), "Each switch takes four pin operations");

        // first two switches share column 0; rows are read in between strobes
        assert_eq!(
            &[
                PinEvent::High(0),
                PinEvent::Settle(3_000),
                PinEvent::Read(0),
                PinEvent::Low(0),
                PinEvent::High(0),
                PinEvent::Settle(3_000),
                PinEvent::Read(1),
                PinEvent::Low(0),
            ],
            &events[..8],
            "Expected left but got right"
        );
        assert_eq!(
            &[
                PinEvent::High(3),
                PinEvent::Settle(3_000),
                PinEvent::Read(3),
                PinEvent::Low(3),
            ],
            &events[events.len() - 4..],
            "Scan should end on the last row of the last column"
        );
    }

    #[test]
    fn scan_is_lazy_and_restartable() {
        let (board, mut sampler) = mock::matrix();

        let first: Vec<_> = sampler.scan().take(2).map(|(position, _)| position).collect();
        assert_eq!(8, board.borrow().events.len(), "Only two switches should have been read");

        let restarted = sampler.scan().next().map(|(position, _)| position);
        assert_eq!(first.first().copied(), restarted, "A new scan starts from the top");
        assert_eq!(POSITIONS, sampler.scan().len());
    }

    #[test]
    fn scan_duration() {
        let (_board, sampler) = mock::matrix();
        assert_eq!(Duration::from_millis(48), sampler.scan_duration());

        let sampler = sampler.with_settle(Duration::from_micros(500));
        assert_eq!(Duration::from_millis(8), sampler.scan_duration());
    }

    #[test]
    fn read_error_releases_strobe() {
        let (board, mut sampler) = mock::matrix();
        board.borrow_mut().faulty_row = Some(2);

        assert_eq!(Err(ErrorKind::Other), sampler.sample());

        let events = &board.borrow().events;
        assert_eq!(
            Some(&PinEvent::Low(0)),
            events.last(),
            "Column should be driven low after the failed read"
        );
    }
}
