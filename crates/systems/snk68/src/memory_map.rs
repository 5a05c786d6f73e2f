//! Per-board address maps
//!
//! A map is two ordered lists of ranges, one per bus direction. Lookups scan
//! the list and take the first range containing the address; addresses
//! outside every range are open bus. Maps are validated once, when the
//! session is built, and are immutable afterwards.

use std::fmt;

use emu_core::m68k_bus::ADDRESS_MASK;
use thiserror::Error;

use crate::board::Board;
use crate::input::{DIP_SWITCH_1, DIP_SWITCH_2};

/// Memory-backed regions owned by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    WorkRam,
    VideoRam,
    SpriteRam,
    PaletteRam,
}

/// Reads answered by a function of inputs and session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadHandler {
    /// Ports 0 and 1 packed into one word
    ControlPorts,
    /// Port 2 in the low byte
    Control2,
    /// A dip switch bank in the high byte
    DipSwitch(usize),
    /// Player 1 rotary joystick, 8 of its 12 position lines
    Dial1,
    /// Player 2 rotary joystick, 8 of its 12 position lines
    Dial2,
    /// Remaining position lines of both dials
    DialLowBits,
    /// Control ports XORed with the protection mask
    ProtectedControls,
    /// Sound CPU status; the sound CPU is never reported busy
    SoundStatus,
    /// Watchdog or interrupt acknowledge strobe
    IrqAck,
}

/// Writes with side effects beyond storing bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteHandler {
    /// Sound latch plus NMI to the sound CPU
    SoundKick,
    FlipScreen,
    /// Password write that arms the control port inversion
    Protection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    /// Program ROM; writes are dropped
    Rom,
    Ram(Region),
    /// Extra code ROM selected by bank number
    BankedRom(usize),
    Read(ReadHandler),
    Write(WriteHandler),
    /// Decoded but ignored (watchdog kicks)
    Nop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub start: u32,
    pub end: u32,
    pub kind: MapKind,
}

impl MapEntry {
    pub const fn new(start: u32, end: u32, kind: MapKind) -> Self {
        Self { start, end, kind }
    }

    pub fn contains(&self, addr: u32) -> bool {
        (self.start..=self.end).contains(&addr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => f.write_str("read"),
            Direction::Write => f.write_str("write"),
        }
    }
}

/// Malformed address map, detected at session start
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("{direction} range {start:06X}-{end:06X} ends before it starts")]
    Inverted {
        direction: Direction,
        start: u32,
        end: u32,
    },
    #[error("{direction} range {start:06X}-{end:06X} exceeds the 24-bit address space")]
    OutOfRange {
        direction: Direction,
        start: u32,
        end: u32,
    },
    #[error("{direction} ranges {first_start:06X}-{first_end:06X} and {second_start:06X}-{second_end:06X} overlap")]
    Overlap {
        direction: Direction,
        first_start: u32,
        first_end: u32,
        second_start: u32,
        second_end: u32,
    },
}

#[derive(Debug, Clone)]
pub struct AddressMap {
    reads: Vec<MapEntry>,
    writes: Vec<MapEntry>,
}

impl AddressMap {
    /// Build a map, rejecting inverted, oversized or overlapping ranges
    pub fn new(reads: Vec<MapEntry>, writes: Vec<MapEntry>) -> Result<Self, MapError> {
        validate(Direction::Read, &reads)?;
        validate(Direction::Write, &writes)?;
        Ok(Self { reads, writes })
    }

    pub fn for_board(board: Board) -> Result<Self, MapError> {
        Self::new(read_map(board), write_map(board))
    }

    pub fn lookup(&self, direction: Direction, addr: u32) -> Option<&MapEntry> {
        let entries = match direction {
            Direction::Read => &self.reads,
            Direction::Write => &self.writes,
        };
        entries.iter().find(|entry| entry.contains(addr))
    }
}

fn validate(direction: Direction, entries: &[MapEntry]) -> Result<(), MapError> {
    for entry in entries {
        if entry.start > entry.end {
            return Err(MapError::Inverted {
                direction,
                start: entry.start,
                end: entry.end,
            });
        }
        if entry.end > ADDRESS_MASK {
            return Err(MapError::OutOfRange {
                direction,
                start: entry.start,
                end: entry.end,
            });
        }
    }

    let mut sorted: Vec<&MapEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.start);
    for pair in sorted.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        if second.start <= first.end {
            return Err(MapError::Overlap {
                direction,
                first_start: first.start,
                first_end: first.end,
                second_start: second.start,
                second_end: second.end,
            });
        }
    }
    Ok(())
}

use MapKind::{BankedRom, Nop, Ram, Read, Rom, Write};

fn read_map(board: Board) -> Vec<MapEntry> {
    let mut map = vec![
        MapEntry::new(0x000000, 0x03ffff, Rom),
        MapEntry::new(0x040000, 0x043fff, Ram(Region::WorkRam)),
    ];

    if board.has_protection() {
        map.push(MapEntry::new(0x080000, 0x080005, Read(ReadHandler::ProtectedControls)));
    } else {
        map.extend([
            MapEntry::new(0x080000, 0x080001, Read(ReadHandler::ControlPorts)),
            MapEntry::new(0x0c0000, 0x0c0001, Read(ReadHandler::Control2)),
        ]);
    }

    if board.has_dials() {
        map.extend([
            MapEntry::new(0x0c0000, 0x0c0001, Read(ReadHandler::Dial1)),
            MapEntry::new(0x0c8000, 0x0c8001, Read(ReadHandler::Dial2)),
            MapEntry::new(0x0d0000, 0x0d0001, Read(ReadHandler::DialLowBits)),
        ]);
    }

    map.extend([
        MapEntry::new(0x0e0000, 0x0e0001, Read(ReadHandler::IrqAck)),
        MapEntry::new(0x0e8000, 0x0e8001, Read(ReadHandler::IrqAck)),
        MapEntry::new(0x0f0000, 0x0f0001, Read(ReadHandler::DipSwitch(DIP_SWITCH_1))),
        MapEntry::new(0x0f0008, 0x0f0009, Read(ReadHandler::DipSwitch(DIP_SWITCH_2))),
        MapEntry::new(0x0f8000, 0x0f8001, Read(ReadHandler::SoundStatus)),
    ]);

    if board == Board::Pow {
        map.extend([
            MapEntry::new(0x100000, 0x100fff, Ram(Region::VideoRam)),
            MapEntry::new(0x200000, 0x207fff, Ram(Region::SpriteRam)),
        ]);
    } else {
        map.extend([
            MapEntry::new(0x100000, 0x107fff, Ram(Region::SpriteRam)),
            MapEntry::new(0x200000, 0x200fff, Ram(Region::VideoRam)),
        ]);
    }

    if board.has_extra_code_bank() {
        map.push(MapEntry::new(0x300000, 0x33ffff, BankedRom(0)));
    }

    map.push(MapEntry::new(0x400000, 0x400fff, Ram(Region::PaletteRam)));
    map
}

fn write_map(board: Board) -> Vec<MapEntry> {
    let mut map = vec![
        MapEntry::new(0x000000, 0x03ffff, Rom),
        MapEntry::new(0x040000, 0x043fff, Ram(Region::WorkRam)),
        MapEntry::new(0x080000, 0x080001, Write(WriteHandler::SoundKick)),
    ];

    if board.has_protection() {
        map.extend([
            MapEntry::new(0x080006, 0x080007, Write(WriteHandler::Protection)),
            MapEntry::new(0x0c0000, 0x0c0001, Write(WriteHandler::FlipScreen)),
        ]);
    } else {
        map.extend([
            MapEntry::new(0x080006, 0x080007, Write(WriteHandler::FlipScreen)),
            // Watchdog
            MapEntry::new(0x0c0000, 0x0c0001, Nop),
        ]);
    }

    if board == Board::Pow {
        map.extend([
            MapEntry::new(0x100000, 0x100fff, Ram(Region::VideoRam)),
            MapEntry::new(0x200000, 0x207fff, Ram(Region::SpriteRam)),
        ]);
    } else {
        map.extend([
            MapEntry::new(0x100000, 0x107fff, Ram(Region::SpriteRam)),
            MapEntry::new(0x200000, 0x200fff, Ram(Region::VideoRam)),
        ]);
    }

    map.push(MapEntry::new(0x400000, 0x400fff, Ram(Region::PaletteRam)));
    map
}
