//! Palette word decoding and pen visibility
//!
//! Each palette word holds three 4-bit channels plus one extra low bit per
//! channel in the top nibble: `xRGB rrrr gggg bbbb` where the high nibble
//! bits 14, 13 and 12 are the least significant bits of red, green and blue.

use emu_core::ppu::palette::{expand_5_to_8, from_rgb, BLACK};
use emu_core::ppu::{IndexedPalette, RamPalette};

use crate::memory::PALETTE_ENTRIES;

/// Pens per color
pub const PENS: usize = 16;
/// Color codes in the palette
pub const COLORS: usize = PALETTE_ENTRIES / PENS;
/// Palette entry the sprite layer is cleared to
pub const BACKGROUND_PEN: usize = 0x7ff;

/// Decode one palette word to ARGB
pub fn decode_color(word: u16) -> u32 {
    let w = word as u32;
    let r = ((w >> 7) & 0x1e) | ((w >> 14) & 1);
    let g = ((w >> 3) & 0x1e) | ((w >> 13) & 1);
    let b = ((w << 1) & 0x1e) | ((w >> 12) & 1);
    from_rgb(
        expand_5_to_8(r as u8),
        expand_5_to_8(g as u8),
        expand_5_to_8(b as u8),
    )
}

/// Which pens of which colors the current frame can show
///
/// Pens nothing on screen references resolve to black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteVisibility {
    used: [u16; COLORS],
}

impl PaletteVisibility {
    pub fn new() -> Self {
        let mut visibility = Self {
            used: [0; COLORS],
        };
        visibility.mark_background();
        visibility
    }

    fn mark_background(&mut self) {
        self.used[BACKGROUND_PEN / PENS] |= 1 << (BACKGROUND_PEN % PENS);
    }

    /// Start a rebuild with only the background pen in use
    pub fn begin(&mut self) {
        self.used = [0; COLORS];
        self.mark_background();
    }

    /// Record the pens a tile drawn in `color` uses
    pub fn add(&mut self, color: usize, pen_usage: u16) {
        if let Some(mask) = self.used.get_mut(color) {
            *mask |= pen_usage;
        }
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.used
            .get(index / PENS)
            .map_or(false, |mask| mask & (1 << (index % PENS)) != 0)
    }

    pub fn color_mask(&self, color: usize) -> u16 {
        self.used.get(color).copied().unwrap_or(0)
    }

    /// Color of a palette entry as displayed this frame
    pub fn resolve(&self, palette: &RamPalette, index: usize) -> u32 {
        if self.is_visible(index) {
            palette.get_color(index)
        } else {
            BLACK
        }
    }
}

impl Default for PaletteVisibility {
    fn default() -> Self {
        Self::new()
    }
}
