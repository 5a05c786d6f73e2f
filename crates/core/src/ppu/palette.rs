//! Indexed palettes for retro video hardware.
//!
//! Pixels produced by tile and sprite hardware are indices into a palette
//! RAM; the palette maps each index to an ARGB8888 color (0xAARRGGBB).

/// Opaque black, the color of every entry before it is written
pub const BLACK: u32 = 0xFF000000;

/// Generic indexed palette that maps color indices to RGB values.
pub trait IndexedPalette {
    /// Get the ARGB color for a palette index.
    fn get_color(&self, index: usize) -> u32;

    /// Set the ARGB color for a palette index.
    fn set_color(&mut self, index: usize, color: u32);

    /// Get the number of colors in this palette.
    fn len(&self) -> usize;

    /// Check if the palette is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A simple RAM-based palette storage.
#[derive(Debug, Clone)]
pub struct RamPalette {
    colors: Vec<u32>,
}

impl RamPalette {
    /// Create a palette of `size` entries, all opaque black
    pub fn new(size: usize) -> Self {
        Self {
            colors: vec![BLACK; size],
        }
    }

    /// Get a slice of all colors.
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Set every entry back to opaque black
    pub fn fill_black(&mut self) {
        self.colors.fill(BLACK);
    }
}

impl IndexedPalette for RamPalette {
    fn get_color(&self, index: usize) -> u32 {
        self.colors.get(index).copied().unwrap_or(BLACK)
    }

    fn set_color(&mut self, index: usize, color: u32) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    fn len(&self) -> usize {
        self.colors.len()
    }
}

/// Widen a 5-bit channel to 8 bits by replicating its top bits into the
/// bottom, so 0x00 maps to 0x00 and 0x1F maps to 0xFF.
#[inline]
pub fn expand_5_to_8(v: u8) -> u8 {
    let v = v & 0x1F;
    (v << 3) | (v >> 2)
}

/// Construct RGB color with full alpha
#[inline]
pub fn from_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Split an ARGB color into its (r, g, b) channels
#[inline]
pub fn to_rgb(color: u32) -> (u8, u8, u8) {
    ((color >> 16) as u8, (color >> 8) as u8, color as u8)
}
