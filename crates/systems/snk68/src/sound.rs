//! Link to the sound CPU
//!
//! The Z80 sound board is emulated elsewhere. The main CPU talks to it through
//! a one byte latch and an NMI line, both behind [`SoundLink`].

use emu_core::logging::{log, LogCategory, LogLevel};

/// Sound CPU side of the command latch
pub trait SoundLink {
    fn write_latch(&mut self, value: u8);

    /// Signal the sound CPU that a command is waiting
    fn raise_nmi(&mut self);
}

/// Latch plus pending NMI, polled by the sound CPU core
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoundLatch {
    latch: u8,
    nmi_pending: bool,
}

impl SoundLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latch(&self) -> u8 {
        self.latch
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Acknowledge the NMI, returning whether one was pending
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SoundLink for SoundLatch {
    fn write_latch(&mut self, value: u8) {
        log(LogCategory::Sound, LogLevel::Debug, || {
            format!("Sound: latch {:02X}", value)
        });
        self.latch = value;
    }

    fn raise_nmi(&mut self) {
        self.nmi_pending = true;
    }
}
