//! Test doubles for the hardware collaborators.

extern crate std;

use crate::{
    io::{ShutdownFlag, ToneOutput, Watchdog},
    matrix::{COLUMNS, MatrixPosition, POSITIONS, ROWS, Snapshot},
    sampler::MatrixSampler,
    tone_pool::GeneratorId,
};
use core::{cell::Cell, convert::Infallible};
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, ErrorType, InputPin, OutputPin},
};
use std::{cell::RefCell, collections::VecDeque, rc::Rc, vec::Vec};

/// Every pin operation the sampler performs, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinEvent {
    High(u8),
    Low(u8),
    Settle(u32),
    Read(u8),
}

/// A key matrix shared by the fake pins.
#[derive(Default)]
pub struct Board {
    /// Switches currently held down.
    pub closed: Snapshot,
    /// Matrix states to switch to at the start of each subsequent scan.
    pub script: VecDeque<Snapshot>,
    /// Requested once the script has run out.
    pub shutdown: Option<Rc<ShutdownFlag>>,
    /// Reads of this row fail.
    pub faulty_row: Option<u8>,
    pub events: Vec<PinEvent>,
    strobed: Option<u8>,
    settles: usize,
}

pub type SharedBoard = Rc<RefCell<Board>>;
pub type FakeSampler = MatrixSampler<FakeColumn, FakeRow, FakeDelay>;

pub struct FakeColumn {
    column: u8,
    board: SharedBoard,
}

impl ErrorType for FakeColumn {
    type Error = Infallible;
}

impl OutputPin for FakeColumn {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut board = self.board.borrow_mut();
        board.strobed = Some(self.column);
        board.events.push(PinEvent::High(self.column));
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut board = self.board.borrow_mut();
        board.strobed = None;
        board.events.push(PinEvent::Low(self.column));
        Ok(())
    }
}

pub struct FakeRow {
    row: u8,
    board: SharedBoard,
}

impl ErrorType for FakeRow {
    type Error = ErrorKind;
}

impl InputPin for FakeRow {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut board = self.board.borrow_mut();
        board.events.push(PinEvent::Read(self.row));
        if board.faulty_row == Some(self.row) {
            return Err(ErrorKind::Other);
        }
        Ok(board
            .strobed
            .and_then(|column| MatrixPosition::new(self.row, column))
            .is_some_and(|position| board.closed.is_closed(position)))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

pub struct FakeDelay {
    board: SharedBoard,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        let mut board = self.board.borrow_mut();
        if board.settles % POSITIONS == 0 {
            // a new scan is starting
            if let Some(next) = board.script.pop_front() {
                board.closed = next;
            } else if let Some(flag) = &board.shutdown {
                flag.request();
            }
        }
        board.settles += 1;
        board.events.push(PinEvent::Settle(us));
    }
}

/// Builds a sampler wired to a fresh, fully open [`Board`].
pub fn matrix() -> (SharedBoard, FakeSampler) {
    let board = SharedBoard::default();
    let columns = core::array::from_fn::<_, COLUMNS, _>(|column| FakeColumn {
        column: column as u8,
        board: board.clone(),
    });
    let rows = core::array::from_fn::<_, ROWS, _>(|row| FakeRow {
        row: row as u8,
        board: board.clone(),
    });
    let delay = FakeDelay {
        board: board.clone(),
    };

    (board, MatrixSampler::new(columns, rows, delay))
}

/// Shorthand for a position known to be inside the matrix.
pub fn position(row: u8, column: u8) -> MatrixPosition {
    MatrixPosition::new(row, column).expect("test positions should be inside the matrix")
}

/// What a [`FakeTones`] was asked to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneEvent {
    Start(GeneratorId, u32),
    Stop(GeneratorId),
}

/// Records tone output instead of making noise.
#[derive(Debug, Default)]
pub struct FakeTones {
    pub events: Vec<ToneEvent>,
}

impl FakeTones {
    /// Generators whose most recent event started a tone.
    pub fn sounding(&self) -> Vec<(GeneratorId, u32)> {
        let mut sounding: Vec<(GeneratorId, u32)> = Vec::new();
        for event in &self.events {
            match *event {
                ToneEvent::Start(generator, frequency) => {
                    sounding.retain(|&(g, _)| g != generator);
                    sounding.push((generator, frequency));
                }
                ToneEvent::Stop(generator) => sounding.retain(|&(g, _)| g != generator),
            }
        }
        sounding.sort();
        sounding
    }
}

impl ToneOutput for FakeTones {
    fn set_tone(&mut self, generator: GeneratorId, frequency: u32) {
        if frequency == 0 {
            self.stop_tone(generator);
        } else {
            self.events.push(ToneEvent::Start(generator, frequency));
        }
    }

    fn stop_tone(&mut self, generator: GeneratorId) {
        self.events.push(ToneEvent::Stop(generator));
    }
}

/// Counts feedings.
#[derive(Debug, Default, Clone)]
pub struct FakeWatchdog {
    pub fed: Rc<Cell<usize>>,
}

impl Watchdog for FakeWatchdog {
    fn feed(&mut self) {
        self.fed.set(self.fed.get() + 1);
    }
}
