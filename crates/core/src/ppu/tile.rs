//! Planar graphics decoding for tile-based video hardware.
//!
//! Arcade graphics ROMs store tiles as bitplanes scattered across the ROM.
//! A [`GfxLayout`] describes, in bits, where each plane, column and row of a
//! tile lives; [`decode`] turns a ROM into a [`DecodedGfx`] holding one pen
//! index per pixel plus a pen-usage mask per tile.
//!
//! Offsets follow the usual arcade convention: bit offset `n` addresses
//! byte `n / 8`, bit `7 - n % 8`, and plane 0 is the most significant bit of
//! the resulting pen.

use thiserror::Error;

/// Errors raised while decoding graphics ROMs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GfxError {
    #[error("Graphics ROM too short: {len} bytes, need at least {needed}")]
    RomTooShort { len: usize, needed: usize },
    #[error("Layout has {0} bitplanes, at most 4 are supported")]
    UnsupportedDepth(usize),
    #[error("Layout offsets do not match a {width}x{height} tile")]
    BadLayout { width: usize, height: usize },
    #[error("Pixel buffer of {len} bytes is not a whole number of {width}x{height} tiles")]
    BadPixelBuffer {
        len: usize,
        width: usize,
        height: usize,
    },
}

/// Bit offset of a bitplane inside a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneOffset {
    /// Absolute offset from the start of the tile
    Bits(usize),
    /// Offset from the start of region part `part` (see [`GfxLayout::region_split`])
    Fraction { part: usize, bits: usize },
}

/// Description of how tiles are laid out in a graphics ROM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfxLayout {
    pub width: usize,
    pub height: usize,
    /// The ROM is cut into this many equal parts; tiles are counted within
    /// one part and fractional plane offsets reach into the others.
    pub region_split: usize,
    pub plane_offsets: Vec<PlaneOffset>,
    pub x_offsets: Vec<usize>,
    pub y_offsets: Vec<usize>,
    /// Distance in bits from one tile to the next
    pub char_increment: usize,
}

impl GfxLayout {
    fn validate(&self) -> Result<(), GfxError> {
        if self.plane_offsets.len() > 4 {
            return Err(GfxError::UnsupportedDepth(self.plane_offsets.len()));
        }
        if self.x_offsets.len() != self.width
            || self.y_offsets.len() != self.height
            || self.region_split == 0
            || self.char_increment == 0
        {
            return Err(GfxError::BadLayout {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Number of complete tiles a ROM of `rom_len` bytes holds
    pub fn tile_count(&self, rom_len: usize) -> usize {
        if self.region_split == 0 || self.char_increment == 0 {
            return 0;
        }
        (rom_len / self.region_split) * 8 / self.char_increment
    }
}

/// Tiles decoded to one pen per pixel
#[derive(Debug, Clone, Default)]
pub struct DecodedGfx {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    pen_usage: Vec<u16>,
}

impl DecodedGfx {
    /// An empty set; every lookup misses
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: Vec::new(),
            pen_usage: Vec::new(),
        }
    }

    /// Build a set from already decoded pens, tiles stored back to back in
    /// row-major order.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, GfxError> {
        let tile_size = width * height;
        if tile_size == 0 || pixels.len() % tile_size != 0 {
            return Err(GfxError::BadPixelBuffer {
                len: pixels.len(),
                width,
                height,
            });
        }
        let pen_usage = pixels
            .chunks_exact(tile_size)
            .map(|tile| tile.iter().fold(0u16, |mask, &pen| mask | 1 << (pen & 0x0F)))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
            pen_usage,
        })
    }

    pub fn tile_width(&self) -> usize {
        self.width
    }

    pub fn tile_height(&self) -> usize {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.pen_usage.len()
    }

    /// Row-major pens of one tile, `None` past the decoded set
    pub fn tile(&self, index: usize) -> Option<&[u8]> {
        let size = self.width * self.height;
        self.pixels.get(index * size..(index + 1) * size)
    }

    /// Pen at (x, y) of a tile; pen 0 outside the set
    pub fn pixel(&self, index: usize, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.tile(index).map_or(0, |t| t[y * self.width + x])
    }

    /// Bit `n` set when pen `n` occurs in the tile
    pub fn pen_usage(&self, index: usize) -> u16 {
        self.pen_usage.get(index).copied().unwrap_or(0)
    }
}

#[inline]
fn read_bit(rom: &[u8], bit: usize) -> bool {
    rom.get(bit / 8)
        .map_or(false, |byte| byte & (0x80 >> (bit % 8)) != 0)
}

/// Decode every complete tile of `rom` according to `layout`
pub fn decode(rom: &[u8], layout: &GfxLayout) -> Result<DecodedGfx, GfxError> {
    layout.validate()?;

    let count = layout.tile_count(rom.len());
    if count == 0 {
        return Err(GfxError::RomTooShort {
            len: rom.len(),
            needed: layout.region_split * layout.char_increment.div_ceil(8),
        });
    }

    let part_bits = (rom.len() / layout.region_split) * 8;
    let planes: Vec<usize> = layout
        .plane_offsets
        .iter()
        .map(|offset| match *offset {
            PlaneOffset::Bits(bits) => bits,
            PlaneOffset::Fraction { part, bits } => part * part_bits + bits,
        })
        .collect();
    let depth = planes.len();

    let mut pixels = Vec::with_capacity(count * layout.width * layout.height);
    for tile in 0..count {
        let base = tile * layout.char_increment;
        for &yo in &layout.y_offsets {
            for &xo in &layout.x_offsets {
                let pen = planes.iter().enumerate().fold(0u8, |pen, (p, &plane)| {
                    if read_bit(rom, base + plane + yo + xo) {
                        pen | 1 << (depth - 1 - p)
                    } else {
                        pen
                    }
                });
                pixels.push(pen);
            }
        }
    }

    DecodedGfx::from_pixels(layout.width, layout.height, pixels)
}
