//! Fix layer: a 32x32 grid of 8x8 characters
//!
//! Cells are stored column-major in video RAM, two words each. The cache
//! keeps the decoded (tile, color) of every cell and is refreshed only for
//! cells the CPU touched since the last frame.

use crate::memory::{VideoRam, TILE_CELLS};

pub const GRID_SIZE: usize = 32;
pub const CELL_SIZE: usize = 8;

/// How a board packs tile number and color into a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileRule {
    /// Low tile byte in word 0; tile high nibble and color in word 1
    Split,
    /// 12-bit tile and 4-bit color in word 0
    Packed,
    /// Packed, except one raw value that the ROM expects to show a fixed tile
    PackedWithKludge,
}

impl TileRule {
    pub fn decode(self, word0: u16, word1: u16) -> TileCell {
        match self {
            TileRule::Split => TileCell {
                tile: (word0 & 0xff) | ((word1 & 0xf0) << 4),
                color: (word1 & 0x0f) as u8,
            },
            TileRule::PackedWithKludge if word0 == 0x80ff => TileCell {
                tile: 0x2ca,
                color: 7,
            },
            TileRule::Packed | TileRule::PackedWithKludge => TileCell {
                tile: word0 & 0x0fff,
                color: (word0 >> 12) as u8,
            },
        }
    }
}

/// Decoded contents of one cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileCell {
    pub tile: u16,
    pub color: u8,
}

/// Column and row of cell `index`
pub fn cell_position(index: usize) -> (usize, usize) {
    (index / GRID_SIZE, index % GRID_SIZE)
}

#[derive(Debug, Clone)]
pub struct TileCache {
    cells: Vec<TileCell>,
    stale: Vec<bool>,
    /// Re-decode every cell on the next update, dirty or not
    full_decode: bool,
}

impl TileCache {
    pub fn new() -> Self {
        Self {
            cells: vec![TileCell::default(); TILE_CELLS],
            stale: vec![true; TILE_CELLS],
            full_decode: true,
        }
    }

    /// Re-decode dirty cells, or all of them after a reset; returns how many
    /// were refreshed
    pub fn update(&mut self, video: &mut VideoRam, rule: TileRule) -> usize {
        let full = std::mem::take(&mut self.full_decode);
        let mut refreshed = 0;
        for index in 0..TILE_CELLS {
            if video.take_dirty(index) || full {
                let (word0, word1) = video.cell_words(index);
                self.cells[index] = rule.decode(word0, word1);
                self.stale[index] = true;
                refreshed += 1;
            }
        }
        refreshed
    }

    pub fn cell(&self, index: usize) -> Option<TileCell> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[TileCell] {
        &self.cells
    }

    pub fn is_stale(&self, index: usize) -> bool {
        self.stale.get(index).copied().unwrap_or(false)
    }

    /// Clear a cell's stale flag, returning whether it was set
    pub fn take_stale(&mut self, index: usize) -> bool {
        self.stale
            .get_mut(index)
            .map_or(false, |flag| std::mem::replace(flag, false))
    }

    pub fn mark_all_stale(&mut self) {
        self.stale.fill(true);
    }

    /// Forget the cache; the next update decodes every cell from video RAM
    pub fn reset(&mut self) {
        self.full_decode = true;
        self.mark_all_stale();
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::m68k_bus::AccessWidth;

    #[test]
    fn test_split_rule() {
        assert_eq!(
            TileRule::Split.decode(0x0005, 0x0003),
            TileCell { tile: 5, color: 3 }
        );
        assert_eq!(
            TileRule::Split.decode(0xffab, 0x00c7),
            TileCell {
                tile: 0xcab,
                color: 7
            }
        );
    }

    #[test]
    fn test_packed_rules() {
        assert_eq!(
            TileRule::Packed.decode(0x9123, 0xffff),
            TileCell {
                tile: 0x123,
                color: 9
            }
        );
        assert_eq!(
            TileRule::Packed.decode(0x80ff, 0),
            TileCell {
                tile: 0x0ff,
                color: 8
            }
        );
        assert_eq!(
            TileRule::PackedWithKludge.decode(0x80ff, 0),
            TileCell {
                tile: 0x2ca,
                color: 7
            }
        );
        assert_eq!(
            TileRule::PackedWithKludge.decode(0x80fe, 0),
            TileCell {
                tile: 0x0fe,
                color: 8
            }
        );
    }

    #[test]
    fn test_cells_are_column_major() {
        assert_eq!(cell_position(0), (0, 0));
        assert_eq!(cell_position(1), (0, 1));
        assert_eq!(cell_position(32), (1, 0));
        assert_eq!(cell_position(TILE_CELLS - 1), (31, 31));
    }

    #[test]
    fn test_update_only_touches_dirty_cells() {
        let mut video = VideoRam::new();
        let mut cache = TileCache::new();
        assert_eq!(cache.update(&mut video, TileRule::Split), TILE_CELLS);
        for index in 0..TILE_CELLS {
            cache.take_stale(index);
        }

        video.write(0x08, AccessWidth::Word, 0x0005);
        video.write(0x0a, AccessWidth::Word, 0x0003);
        assert!(video.is_dirty(2));
        assert_eq!(cache.update(&mut video, TileRule::Split), 1);
        assert!(!video.is_dirty(2));
        assert!(cache.is_stale(2));
        assert!(!cache.is_stale(3));
        assert_eq!(cache.cell(2), Some(TileCell { tile: 5, color: 3 }));
        assert_eq!(cache.update(&mut video, TileRule::Split), 0);
    }

    #[test]
    fn test_reset_redecodes_clean_cells() {
        let mut video = VideoRam::new();
        video.write(0, AccessWidth::Word, 0x1234);
        let mut cache = TileCache::new();
        cache.update(&mut video, TileRule::Packed);
        cache.take_stale(0);
        assert!(!video.is_dirty(0));

        cache.reset();
        assert!(cache.is_stale(0));
        assert_eq!(cache.update(&mut video, TileRule::Packed), TILE_CELLS);
        assert_eq!(
            cache.cell(0),
            Some(TileCell {
                tile: 0x234,
                color: 1
            })
        );
        assert_eq!(cache.update(&mut video, TileRule::Packed), 0);
        assert!(cache.cell(TILE_CELLS).is_none());
    }
}
