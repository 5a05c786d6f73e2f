//! Sprite layer: columns of 16x16 cells
//!
//! Each of the three banks holds 32 columns. A column has one position and
//! 32 cells stacked downwards, wrapping around a 512 line space. Cells with
//! color 0 are not drawn.

use crate::board::Board;
use crate::memory::{SessionState, SpriteRam};

pub const BANKS: usize = 3;
pub const SLOTS: usize = 32;
pub const CELLS_PER_COLUMN: usize = 32;
pub const SPRITE_SIZE: i32 = 16;

const SLOT_STRIDE: usize = 0x80;
const HALF_BANK: usize = 0x1000;

/// How the tile word's top bits select mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteFlipMode {
    /// Bit 14 mirrors X, bit 15 mirrors Y
    Independent,
    /// Bit 15 mirrors X, or Y while sprite flip is latched
    GlobalSelect,
}

impl SpriteFlipMode {
    /// Tile number and (flip x, flip y) of a tile word
    pub fn decode(self, word: u16, sprite_flip: bool) -> (u16, bool, bool) {
        let bit15 = word & 0x8000 != 0;
        match self {
            SpriteFlipMode::Independent => (word & 0x3fff, word & 0x4000 != 0, bit15),
            SpriteFlipMode::GlobalSelect if sprite_flip => (word & 0x7fff, false, bit15),
            SpriteFlipMode::GlobalSelect => (word & 0x7fff, bit15, false),
        }
    }
}

/// Column X from its position words: 9 bits, biased so -16 is reachable
pub fn sprite_x(x_word: u16, y_word: u16) -> i32 {
    let x = (((x_word & 0xff) as i32) << 4) | (y_word >> 12) as i32;
    ((x + 16) & 0x1ff) - 16
}

/// Wrap into [-256, 255]
fn wrap_signed_9(v: i32) -> i32 {
    ((v + 0x100) & 0x1ff) - 0x100
}

/// Column Y from its Y word, in [-255, 256]; the hardware counts upwards
pub fn sprite_y(y_word: u16) -> i32 {
    -wrap_signed_9(y_word as i32)
}

/// Keep a cell inside the 512 line space, allowing a partial cell at the top
fn wrap_row(y: i32) -> i32 {
    ((y + SPRITE_SIZE) & 0x1ff) - SPRITE_SIZE
}

/// One cell ready to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteCell {
    pub x: i32,
    pub y: i32,
    pub tile: u16,
    /// Color code, 1..=127
    pub color: u8,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Visit every drawable cell in draw order
///
/// Banks follow the board's priority order; later cells cover earlier ones.
/// Cells with color 0 or a tile above the board's limit are skipped.
pub fn for_each_cell<F>(sprites: &SpriteRam, board: Board, state: &SessionState, mut f: F)
where
    F: FnMut(SpriteCell),
{
    let mode = board.sprite_flip_mode();
    let limit = board.sprite_tile_limit();

    for &bank in board.sprite_order() {
        for slot in 0..SLOTS {
            let position = slot * SLOT_STRIDE + 4 * bank;
            let x_word = sprites.word(position + 4);
            let y_word = sprites.word(position + 6);

            let mut x = sprite_x(x_word, y_word);
            let mut y = sprite_y(y_word);
            let mut step = SPRITE_SIZE;
            if state.flip_screen {
                x = 240 - x;
                y = 240 - y;
                step = -SPRITE_SIZE;
            }

            let base = HALF_BANK * (bank + 1) + slot * SLOT_STRIDE;
            for row in 0..CELLS_PER_COLUMN {
                let color = (sprites.word(base + row * 4) & 0x7f) as u8;
                if color == 0 {
                    continue;
                }
                let (tile, mut flip_x, mut flip_y) =
                    mode.decode(sprites.word(base + row * 4 + 2), state.sprite_flip);
                if tile > limit {
                    continue;
                }
                if state.flip_screen {
                    flip_x = !flip_x;
                    flip_y = !flip_y;
                }
                f(SpriteCell {
                    x,
                    y: wrap_row(y + step * row as i32),
                    tile,
                    color,
                    flip_x,
                    flip_y,
                });
            }
        }
    }
}
