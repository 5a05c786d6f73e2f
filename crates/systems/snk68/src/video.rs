//! Video compositor
//!
//! Once per frame the compositor pulls the CPU's writes out of the shared
//! regions and builds a picture:
//!
//! ```text
//! Idle -> UpdatingTiles -> RebuildingPaletteUsage -> RenderingTiles
//!      -> DrawingSprites -> CompositingOverlay -> Idle
//! ```
//!
//! The fix layer is cached as palette indices and redrawn per cell only when
//! the cell changed or the set of visible pens did. Sprites are drawn from
//! scratch every frame. The fix layer always sits on top.

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::ppu::palette::BLACK;
use emu_core::ppu::DecodedGfx;
use emu_core::renderer::Renderer;
use emu_core::types::Frame;

use crate::board::Board;
use crate::memory::{Regions, SessionState, TILE_CELLS};
use crate::palette::{PaletteVisibility, BACKGROUND_PEN, PENS};
use crate::sprites::{for_each_cell, SpriteCell, SPRITE_SIZE};
use crate::tilemap::{cell_position, TileCache, CELL_SIZE};

pub const SCREEN_WIDTH: u32 = 256;
pub const SCREEN_HEIGHT: u32 = 224;
/// First layer line shown on screen
pub const VISIBLE_TOP: usize = 16;
/// Both layers are 256x256 before cropping
pub const LAYER_SIZE: usize = 256;

/// Transparent fix layer pixel
const CLEAR: u16 = 0xffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    UpdatingTiles,
    RebuildingPaletteUsage,
    RenderingTiles,
    DrawingSprites,
    CompositingOverlay,
}

/// What one frame had to redo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells re-decoded from video RAM
    pub tiles_updated: usize,
    /// Cells whose pixels were redrawn
    pub cells_redrawn: usize,
    pub palette_changed: bool,
}

pub struct Compositor {
    board: Board,
    chars: DecodedGfx,
    sprites: DecodedGfx,

    tiles: TileCache,
    visibility: PaletteVisibility,

    fix_layer: Vec<u16>,
    sprite_layer: Vec<u16>,
    frame: Frame,
    phase: FramePhase,
}

impl Compositor {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            chars: DecodedGfx::empty(CELL_SIZE, CELL_SIZE),
            sprites: DecodedGfx::empty(SPRITE_SIZE as usize, SPRITE_SIZE as usize),
            tiles: TileCache::new(),
            visibility: PaletteVisibility::new(),
            fix_layer: vec![CLEAR; LAYER_SIZE * LAYER_SIZE],
            sprite_layer: vec![BACKGROUND_PEN as u16; LAYER_SIZE * LAYER_SIZE],
            frame: Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            phase: FramePhase::Idle,
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn set_chars(&mut self, chars: DecodedGfx) {
        self.chars = chars;
        self.tiles.mark_all_stale();
    }

    pub fn set_sprites(&mut self, sprites: DecodedGfx) {
        self.sprites = sprites;
    }

    pub fn chars(&self) -> &DecodedGfx {
        &self.chars
    }

    pub fn sprites(&self) -> &DecodedGfx {
        &self.sprites
    }

    pub fn tiles(&self) -> &TileCache {
        &self.tiles
    }

    pub fn visibility(&self) -> &PaletteVisibility {
        &self.visibility
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    fn enter(&mut self, phase: FramePhase) {
        log(LogCategory::Video, LogLevel::Trace, || {
            format!("Video: {:?} -> {:?}", self.phase, phase)
        });
        self.phase = phase;
    }

    /// Render one frame from the current contents of the regions
    pub fn render_frame(&mut self, regions: &mut Regions, state: &SessionState) -> FrameStats {
        let mut stats = FrameStats::default();

        self.enter(FramePhase::UpdatingTiles);
        stats.tiles_updated = self.tiles.update(&mut regions.video, self.board.tile_rule());

        self.enter(FramePhase::RebuildingPaletteUsage);
        stats.palette_changed = self.rebuild_visibility(regions, state);
        if stats.palette_changed {
            self.tiles.mark_all_stale();
        }

        self.enter(FramePhase::RenderingTiles);
        stats.cells_redrawn = self.render_tiles(state.flip_screen);

        self.enter(FramePhase::DrawingSprites);
        self.draw_sprites(regions, state);

        self.enter(FramePhase::CompositingOverlay);
        self.composite(regions);

        self.enter(FramePhase::Idle);
        stats
    }

    /// Returns true when any pen changed visibility
    fn rebuild_visibility(&mut self, regions: &Regions, state: &SessionState) -> bool {
        let previous = self.visibility.clone();
        self.visibility.begin();

        let sprites = &self.sprites;
        let visibility = &mut self.visibility;
        for_each_cell(&regions.sprites, self.board, state, |cell| {
            visibility.add(cell.color as usize, sprites.pen_usage(cell.tile as usize));
        });
        for cell in self.tiles.cells() {
            self.visibility
                .add(cell.color as usize, self.chars.pen_usage(cell.tile as usize));
        }

        let changed = self.visibility != previous;
        if changed {
            log(LogCategory::Video, LogLevel::Trace, || {
                "Video: visible palette changed, redrawing fix layer".to_string()
            });
        }
        changed
    }

    fn render_tiles(&mut self, flip_screen: bool) -> usize {
        let mut redrawn = 0;
        for index in 0..TILE_CELLS {
            if !self.tiles.take_stale(index) {
                continue;
            }
            let Some(cell) = self.tiles.cell(index) else {
                continue;
            };
            let (col, row) = cell_position(index);
            let (mut x0, mut y0) = (col * CELL_SIZE, row * CELL_SIZE);
            if flip_screen {
                x0 = LAYER_SIZE - CELL_SIZE - x0;
                y0 = LAYER_SIZE - CELL_SIZE - y0;
            }

            let base = cell.color as u16 * PENS as u16;
            for py in 0..CELL_SIZE {
                for px in 0..CELL_SIZE {
                    let (sx, sy) = if flip_screen {
                        (CELL_SIZE - 1 - px, CELL_SIZE - 1 - py)
                    } else {
                        (px, py)
                    };
                    let pen = self.chars.pixel(cell.tile as usize, sx, sy);
                    self.fix_layer[(y0 + py) * LAYER_SIZE + x0 + px] = if pen == 0 {
                        CLEAR
                    } else {
                        base + pen as u16
                    };
                }
            }
            redrawn += 1;
        }
        redrawn
    }

    fn draw_sprites(&mut self, regions: &Regions, state: &SessionState) {
        self.sprite_layer.fill(BACKGROUND_PEN as u16);

        let gfx = &self.sprites;
        let layer = &mut self.sprite_layer;
        for_each_cell(&regions.sprites, self.board, state, |cell| {
            if (cell.tile as usize) < gfx.tile_count() {
                draw_cell(layer, gfx, cell);
            }
        });
    }

    fn composite(&mut self, regions: &Regions) {
        let palette = regions.palette.colors();
        let width = SCREEN_WIDTH as usize;
        for y in 0..SCREEN_HEIGHT as usize {
            let layer_row = (y + VISIBLE_TOP) * LAYER_SIZE;
            for x in 0..width {
                let fix = self.fix_layer[layer_row + x];
                let index = if fix == CLEAR {
                    self.sprite_layer[layer_row + x]
                } else {
                    fix
                };
                self.frame.pixels[y * width + x] = self.visibility.resolve(palette, index as usize);
            }
        }
    }
}

fn draw_cell(layer: &mut [u16], gfx: &DecodedGfx, cell: SpriteCell) {
    let size = SPRITE_SIZE as usize;
    let base = cell.color as u16 * PENS as u16;
    for py in 0..size {
        let y = cell.y + py as i32;
        if !(0..LAYER_SIZE as i32).contains(&y) {
            continue;
        }
        let sy = if cell.flip_y { size - 1 - py } else { py };
        for px in 0..size {
            let x = cell.x + px as i32;
            if !(0..LAYER_SIZE as i32).contains(&x) {
                continue;
            }
            let sx = if cell.flip_x { size - 1 - px } else { px };
            let pen = gfx.pixel(cell.tile as usize, sx, sy);
            if pen != 0 {
                layer[y as usize * LAYER_SIZE + x as usize] = base + pen as u16;
            }
        }
    }
}

impl Renderer for Compositor {
    fn get_frame(&self) -> &Frame {
        &self.frame
    }

    fn clear(&mut self, color: u32) {
        self.frame.pixels.fill(color);
    }

    fn reset(&mut self) {
        self.tiles.reset();
        self.visibility = PaletteVisibility::new();
        self.fix_layer.fill(CLEAR);
        self.sprite_layer.fill(BACKGROUND_PEN as u16);
        self.phase = FramePhase::Idle;
        self.clear(BLACK);
    }

    fn name(&self) -> &str {
        "SNK 68000 Compositor"
    }

    /// The board's screen is fixed, so any other size is refused
    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (SCREEN_WIDTH, SCREEN_HEIGHT) {
            log(LogCategory::Video, LogLevel::Warn, || {
                format!(
                    "Video: ignoring resize to {}x{}, screen stays {}x{}",
                    width, height, SCREEN_WIDTH, SCREEN_HEIGHT
                )
            });
        }
        self.frame = Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    }
}
