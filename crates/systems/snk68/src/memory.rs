//! Memory regions shared between the bus and the video hardware
//!
//! The 68000 data bus is 16 bits wide, so every write is broken into word
//! lanes: an aligned word offset, the data and a mask of the bytes actually
//! driven. Region write rules work on lanes, which keeps byte, word and long
//! writes consistent with each other.

use emu_core::m68k_bus::AccessWidth;
use emu_core::ppu::{IndexedPalette, RamPalette};

use crate::palette::decode_color;

pub const WORK_RAM_SIZE: usize = 0x4000;
pub const VIDEO_RAM_SIZE: usize = 0x1000;
pub const SPRITE_RAM_SIZE: usize = 0x8000;
pub const PALETTE_RAM_SIZE: usize = 0x1000;

/// Fix layer cells, 4 bytes each
pub const TILE_CELLS: usize = VIDEO_RAM_SIZE / 4;
pub const PALETTE_ENTRIES: usize = PALETTE_RAM_SIZE / 2;

/// One 16-bit slice of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLane {
    /// Even byte offset of the word
    pub offset: u32,
    pub value: u16,
    /// Bytes driven by the CPU
    pub mask: u16,
}

impl WordLane {
    /// Combine with the word already stored
    pub fn merge(self, old: u16) -> u16 {
        (old & !self.mask) | (self.value & self.mask)
    }
}

/// Split a write into the word lanes it drives
pub fn word_lanes(offset: u32, width: AccessWidth, value: u32) -> impl Iterator<Item = WordLane> {
    let even = offset & !1;
    let (first, second) = match width {
        AccessWidth::Byte if offset & 1 == 0 => (
            WordLane {
                offset: even,
                value: ((value & 0xff) as u16) << 8,
                mask: 0xff00,
            },
            None,
        ),
        AccessWidth::Byte => (
            WordLane {
                offset: even,
                value: (value & 0xff) as u16,
                mask: 0x00ff,
            },
            None,
        ),
        AccessWidth::Word => (
            WordLane {
                offset: even,
                value: value as u16,
                mask: 0xffff,
            },
            None,
        ),
        AccessWidth::Long => (
            WordLane {
                offset: even,
                value: (value >> 16) as u16,
                mask: 0xffff,
            },
            Some(WordLane {
                offset: even.wrapping_add(2),
                value: value as u16,
                mask: 0xffff,
            }),
        ),
    };
    std::iter::once(first).chain(second)
}

/// Big-endian read from a mirrored store, `None` when the store is empty
pub fn read_mirrored(bytes: &[u8], offset: u32, width: AccessWidth) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    let len = bytes.len();
    let value = (0..width.bytes() as usize).fold(0u32, |acc, i| {
        let index = (offset as usize + i) % len;
        (acc << 8) | bytes[index] as u32
    });
    Some(value)
}

/// Plain byte store, mirrored over any range larger than itself
#[derive(Debug, Clone)]
pub struct Ram {
    bytes: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size.max(2)],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    fn index(&self, offset: u32) -> usize {
        offset as usize % self.bytes.len()
    }

    pub fn read(&self, offset: u32, width: AccessWidth) -> u32 {
        read_mirrored(&self.bytes, offset, width).unwrap_or_else(|| width.open_bus())
    }

    pub fn read_word(&self, offset: u32) -> u16 {
        let index = self.index(offset & !1);
        u16::from_be_bytes([self.bytes[index], self.bytes[(index + 1) % self.bytes.len()]])
    }

    pub fn write_lane(&mut self, lane: WordLane) {
        let index = self.index(lane.offset);
        let [hi, lo] = lane.value.to_be_bytes();
        if lane.mask & 0xff00 != 0 {
            self.bytes[index] = hi;
        }
        if lane.mask & 0x00ff != 0 {
            let next = (index + 1) % self.bytes.len();
            self.bytes[next] = lo;
        }
    }

    pub fn write(&mut self, offset: u32, width: AccessWidth, value: u32) {
        for lane in word_lanes(offset, width, value) {
            self.write_lane(lane);
        }
    }
}

/// Fix layer RAM with one dirty flag per cell
#[derive(Debug, Clone)]
pub struct VideoRam {
    ram: Ram,
    dirty: Vec<bool>,
}

impl VideoRam {
    pub fn new() -> Self {
        Self {
            ram: Ram::new(VIDEO_RAM_SIZE),
            dirty: vec![true; TILE_CELLS],
        }
    }

    /// A full word whose high byte is 0xff only updates the low byte
    pub fn write(&mut self, offset: u32, width: AccessWidth, value: u32) {
        for mut lane in word_lanes(offset, width, value) {
            if lane.mask == 0xffff && lane.value >> 8 == 0xff {
                lane.mask = 0x00ff;
            }
            self.ram.write_lane(lane);
            let cell = self.cell_of(lane.offset);
            self.dirty[cell] = true;
        }
    }

    pub fn read(&self, offset: u32, width: AccessWidth) -> u32 {
        self.ram.read(offset, width)
    }

    fn cell_of(&self, offset: u32) -> usize {
        (offset as usize % self.ram.len()) / 4
    }

    /// Tile word and attribute word of a cell
    pub fn cell_words(&self, cell: usize) -> (u16, u16) {
        let base = (cell * 4) as u32;
        (self.ram.read_word(base), self.ram.read_word(base + 2))
    }

    pub fn is_dirty(&self, cell: usize) -> bool {
        self.dirty.get(cell).copied().unwrap_or(false)
    }

    /// Clear a cell's dirty flag, returning whether it was set
    pub fn take_dirty(&mut self, cell: usize) -> bool {
        self.dirty
            .get_mut(cell)
            .map_or(false, |flag| std::mem::replace(flag, false))
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    pub fn clear(&mut self) {
        self.ram.clear();
        self.mark_all_dirty();
    }
}

impl Default for VideoRam {
    fn default() -> Self {
        Self::new()
    }
}

/// Sprite RAM; position words carry an attribute byte that always reads 0xff
#[derive(Debug, Clone)]
pub struct SpriteRam {
    ram: Ram,
}

impl SpriteRam {
    pub fn new() -> Self {
        Self {
            ram: Ram::new(SPRITE_RAM_SIZE),
        }
    }

    pub fn write(&mut self, offset: u32, width: AccessWidth, value: u32) {
        for mut lane in word_lanes(offset, width, value) {
            if lane.offset & 2 == 0 && lane.mask & 0xff00 != 0 {
                lane.value |= 0xff00;
            }
            self.ram.write_lane(lane);
        }
    }

    pub fn read(&self, offset: u32, width: AccessWidth) -> u32 {
        self.ram.read(offset, width)
    }

    pub fn word(&self, offset: usize) -> u16 {
        self.ram.read_word(offset as u32)
    }

    pub fn clear(&mut self) {
        self.ram.clear();
    }
}

impl Default for SpriteRam {
    fn default() -> Self {
        Self::new()
    }
}

/// Palette RAM plus the colors decoded from it
#[derive(Debug, Clone)]
pub struct PaletteRam {
    ram: Ram,
    colors: RamPalette,
}

impl PaletteRam {
    pub fn new() -> Self {
        Self {
            ram: Ram::new(PALETTE_RAM_SIZE),
            colors: RamPalette::new(PALETTE_ENTRIES),
        }
    }

    pub fn write(&mut self, offset: u32, width: AccessWidth, value: u32) {
        for lane in word_lanes(offset, width, value) {
            let word = lane.merge(self.ram.read_word(lane.offset));
            self.ram.write_lane(WordLane {
                offset: lane.offset,
                value: word,
                mask: 0xffff,
            });
            let index = (lane.offset as usize % PALETTE_RAM_SIZE) / 2;
            self.colors.set_color(index, decode_color(word));
        }
    }

    pub fn read(&self, offset: u32, width: AccessWidth) -> u32 {
        self.ram.read(offset, width)
    }

    pub fn word(&self, index: usize) -> u16 {
        self.ram.read_word((index * 2) as u32)
    }

    pub fn colors(&self) -> &RamPalette {
        &self.colors
    }

    pub fn clear(&mut self) {
        self.ram.clear();
        self.colors.fill_black();
    }
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self::new()
    }
}

/// Every RAM region of a session
#[derive(Debug, Clone)]
pub struct Regions {
    pub work_ram: Ram,
    pub video: VideoRam,
    pub sprites: SpriteRam,
    pub palette: PaletteRam,
}

impl Regions {
    pub fn new() -> Self {
        Self {
            work_ram: Ram::new(WORK_RAM_SIZE),
            video: VideoRam::new(),
            sprites: SpriteRam::new(),
            palette: PaletteRam::new(),
        }
    }

    pub fn clear(&mut self) {
        self.work_ram.clear();
        self.video.clear();
        self.sprites.clear();
        self.palette.clear();
    }
}

impl Default for Regions {
    fn default() -> Self {
        Self::new()
    }
}

/// Latches written by the main CPU and read by the video hardware
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub flip_screen: bool,
    pub sprite_flip: bool,
    /// 0x00 or 0xff, XORed into the protected control ports
    pub invert: u8,
    /// Level 1 vblank interrupt waiting for the CPU
    pub irq_pending: bool,
}
