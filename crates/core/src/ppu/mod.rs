//! Reusable building blocks for tile-based video hardware.
//!
//! Each system composes these into its own video pipeline.

pub mod palette;
pub mod tile;

pub use palette::{IndexedPalette, RamPalette};
pub use tile::{DecodedGfx, GfxError, GfxLayout};
