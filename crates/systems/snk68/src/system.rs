//! SNK 68000 board session

use std::cell::RefCell;
use std::rc::Rc;

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::ppu::{DecodedGfx, GfxError};
use emu_core::renderer::Renderer;
use emu_core::types::Frame;
use emu_core::{MountPointInfo, System};
use thiserror::Error;

use crate::board::Board;
use crate::bus::Snk68Bus;
use crate::config::SessionConfig;
use crate::gfx::{decode_chars, decode_sprites};
use crate::input::{DIP_SWITCH_1, DIP_SWITCH_2};
use crate::memory_map::MapError;
use crate::sound::SoundLatch;
use crate::sprites::SPRITE_SIZE;
use crate::tilemap::CELL_SIZE;
use crate::video::{Compositor, FrameStats};

const MAIN_CPU: &str = "maincpu";
const EXTRA_BANK: &str = "bank1";
const CHARS: &str = "gfx1";
const SPRITES: &str = "gfx2";

/// SNK 68000 emulator errors
#[derive(Debug, Error)]
pub enum Snk68Error {
    #[error("Invalid mount point: {0}")]
    InvalidMountPoint(String),
    #[error("Bad address map: {0}")]
    Map(#[from] MapError),
    #[error("Graphics ROM {mount}: {source}")]
    Graphics {
        mount: String,
        #[source]
        source: GfxError,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown log level: {0}")]
    LogLevel(String),
}

/// One SNK 68000 board: bus, video and the latches between them
///
/// The 68000 core drives [`Snk68System::bus_mut`] between frames and polls
/// [`Snk68System::take_irq`]; the Z80 core polls the shared [`SoundLatch`].
pub struct Snk68System {
    config: SessionConfig,
    bus: Snk68Bus,
    video: Compositor,
    sound: Rc<RefCell<SoundLatch>>,
    last_stats: FrameStats,
    frames: u64,
}

impl Snk68System {
    pub fn new(board: Board) -> Result<Self, Snk68Error> {
        Self::with_config(SessionConfig::new(board))
    }

    pub fn with_config(config: SessionConfig) -> Result<Self, Snk68Error> {
        // Rejects a bad level; applying it is up to the frontend
        config.log_level()?;

        let sound = Rc::new(RefCell::new(SoundLatch::new()));
        let mut bus = Snk68Bus::new(config.board, sound.clone()).map_err(|e| {
            log(LogCategory::Config, LogLevel::Error, || {
                format!("Config: {}: {}", config.board.name(), e)
            });
            e
        })?;
        bus.inputs_mut().set(DIP_SWITCH_1, config.dip_switch_1);
        bus.inputs_mut().set(DIP_SWITCH_2, config.dip_switch_2);

        log(LogCategory::Config, LogLevel::Info, || {
            format!("Config: {} session created", config.board.name())
        });

        Ok(Self {
            video: Compositor::new(config.board),
            config,
            bus,
            sound,
            last_stats: FrameStats::default(),
            frames: 0,
        })
    }

    pub fn board(&self) -> Board {
        self.config.board
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn bus(&self) -> &Snk68Bus {
        &self.bus
    }

    /// Bus handed to the 68000 core
    pub fn bus_mut(&mut self) -> &mut Snk68Bus {
        &mut self.bus
    }

    /// Latch shared with the sound CPU
    pub fn sound(&self) -> Rc<RefCell<SoundLatch>> {
        Rc::clone(&self.sound)
    }

    pub fn compositor(&self) -> &Compositor {
        &self.video
    }

    /// Set an input port; returns false for ports that do not exist
    pub fn set_input(&mut self, port: usize, value: u8) -> bool {
        log(LogCategory::Input, LogLevel::Trace, || {
            format!("Input: port {} = {:02X}", port, value)
        });
        self.bus.inputs_mut().set(port, value)
    }

    /// Whether the vblank interrupt is waiting for the CPU
    pub fn irq_pending(&self) -> bool {
        self.bus.state().irq_pending
    }

    /// Acknowledge the vblank interrupt, returning whether one was pending
    pub fn take_irq(&mut self) -> bool {
        std::mem::take(&mut self.bus.state_mut().irq_pending)
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    fn graphics_error(mount: &str, source: GfxError) -> Snk68Error {
        log(LogCategory::Config, LogLevel::Error, || {
            format!("Config: {} rejected: {}", mount, source)
        });
        Snk68Error::Graphics {
            mount: mount.to_string(),
            source,
        }
    }

    fn has_mount_point(&self, id: &str) -> bool {
        match id {
            MAIN_CPU | CHARS | SPRITES => true,
            EXTRA_BANK => self.board().has_extra_code_bank(),
            _ => false,
        }
    }
}

impl System for Snk68System {
    type Error = Snk68Error;

    fn reset(&mut self) {
        self.bus.reset();
        self.sound.borrow_mut().reset();
        self.video.reset();
        self.last_stats = FrameStats::default();
        self.frames = 0;
    }

    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        self.bus.state_mut().irq_pending = true;

        let (regions, state) = self.bus.video_view();
        self.last_stats = self.video.render_frame(regions, state);
        self.frames += 1;

        Ok(self.video.get_frame().clone())
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        let mut points = vec![MountPointInfo {
            id: MAIN_CPU.to_string(),
            name: "Program ROM".to_string(),
            extensions: vec!["bin".to_string(), "rom".to_string()],
            required: true,
        }];
        if self.board().has_extra_code_bank() {
            points.push(MountPointInfo {
                id: EXTRA_BANK.to_string(),
                name: "Extra Code ROM".to_string(),
                extensions: vec!["bin".to_string(), "rom".to_string()],
                required: true,
            });
        }
        points.push(MountPointInfo {
            id: CHARS.to_string(),
            name: "Character ROM".to_string(),
            extensions: vec!["bin".to_string(), "rom".to_string()],
            required: true,
        });
        points.push(MountPointInfo {
            id: SPRITES.to_string(),
            name: "Sprite ROM".to_string(),
            extensions: vec!["bin".to_string(), "rom".to_string()],
            required: true,
        });
        points
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        if !self.has_mount_point(mount_point_id) {
            return Err(Snk68Error::InvalidMountPoint(mount_point_id.to_string()));
        }
        match mount_point_id {
            MAIN_CPU => self.bus.set_rom(data.to_vec()),
            EXTRA_BANK => self.bus.set_bank(0, data.to_vec()),
            CHARS => {
                let chars = decode_chars(data).map_err(|e| Self::graphics_error(CHARS, e))?;
                self.video.set_chars(chars);
            }
            _ => {
                let sprites =
                    decode_sprites(data).map_err(|e| Self::graphics_error(SPRITES, e))?;
                self.video.set_sprites(sprites);
            }
        }
        log(LogCategory::Config, LogLevel::Info, || {
            format!("Config: mounted {} ({} bytes)", mount_point_id, data.len())
        });
        Ok(())
    }

    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error> {
        if !self.has_mount_point(mount_point_id) {
            return Err(Snk68Error::InvalidMountPoint(mount_point_id.to_string()));
        }
        match mount_point_id {
            MAIN_CPU => self.bus.set_rom(Vec::new()),
            EXTRA_BANK => self.bus.set_bank(0, Vec::new()),
            CHARS => self.video.set_chars(DecodedGfx::empty(CELL_SIZE, CELL_SIZE)),
            _ => {
                let size = SPRITE_SIZE as usize;
                self.video.set_sprites(DecodedGfx::empty(size, size));
            }
        }
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        match mount_point_id {
            MAIN_CPU => !self.bus.rom().is_empty(),
            EXTRA_BANK => self.bus.bank(0).is_some(),
            CHARS => self.video.chars().tile_count() > 0,
            SPRITES => self.video.sprites().tile_count() > 0,
            _ => false,
        }
    }
}
