//! Input port snapshots set by the host

use serde::{Deserialize, Serialize};

/// Ports 0-2 are joysticks, buttons and coins, 3-4 dip switches, 5-6 the
/// rotary joysticks
pub const PORT_COUNT: usize = 8;

pub const DIP_SWITCH_1: usize = 3;
pub const DIP_SWITCH_2: usize = 4;
pub const DIAL_1: usize = 5;
pub const DIAL_2: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPorts {
    ports: [u8; PORT_COUNT],
}

impl InputPorts {
    /// Controls idle high, dials centered at position 0
    pub fn new() -> Self {
        let mut ports = [0xff; PORT_COUNT];
        ports[DIAL_1] = 0;
        ports[DIAL_2] = 0;
        Self { ports }
    }

    /// Port value, 0xff for ports that do not exist
    pub fn get(&self, port: usize) -> u8 {
        self.ports.get(port).copied().unwrap_or(0xff)
    }

    /// Returns false when the port does not exist
    pub fn set(&mut self, port: usize, value: u8) -> bool {
        match self.ports.get_mut(port) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Position lines of a 12-way rotary joystick: one line low, the rest high
    pub fn rotary(&self, port: usize) -> u16 {
        let position = self.get(port) as u32 * 12 / 256;
        !(1u16 << position)
    }
}

impl Default for InputPorts {
    fn default() -> Self {
        Self::new()
    }
}
