//! SNK 68000 arcade hardware
//!
//! This crate implements the hardware shared by SNK's late 80s 68000 boards:
//! P.O.W. - Prisoners of War, Street Smart, Ikari III and Search and Rescue.
//!
//! # Architecture
//!
//! - **Main CPU**: Motorola 68000 @ 9 MHz, driven by an external core through
//!   [`emu_core::m68k_bus::M68kBus`]
//! - **Sound CPU**: Zilog Z80 @ 4 MHz, reached through a command latch and NMI
//! - **Video**: 32x32 fix layer of 8x8 characters over three banks of 16x16
//!   sprite columns, 2048 color palette, 256x224 visible
//! - **Protection**: later boards invert their control ports until the game
//!   writes a password

pub mod board;
pub mod bus;
pub mod config;
pub mod gfx;
pub mod input;
pub mod memory;
pub mod memory_map;
pub mod palette;
pub mod sound;
pub mod sprites;
pub mod system;
pub mod tilemap;
pub mod video;

pub use board::Board;
pub use bus::Snk68Bus;
pub use config::SessionConfig;
pub use sound::{SoundLatch, SoundLink};
pub use system::{Snk68Error, Snk68System};
pub use video::{Compositor, FramePhase};
