//! Memory interface for 68000-family CPU cores
//!
//! The 68000 drives a 24-bit address bus and a 16-bit big-endian data bus.
//! A CPU core hands every access to an implementation of [`M68kBus`] as one
//! transaction: byte, word or long. Long transactions are passed whole so a
//! board can react to all 32 bits of a write at once.

/// Width of a single bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessWidth {
    Byte,
    Word,
    Long,
}

impl AccessWidth {
    /// Number of bytes moved by this transaction
    pub fn bytes(self) -> u32 {
        match self {
            AccessWidth::Byte => 1,
            AccessWidth::Word => 2,
            AccessWidth::Long => 4,
        }
    }

    /// Mask covering a value of this width
    pub fn mask(self) -> u32 {
        match self {
            AccessWidth::Byte => 0xFF,
            AccessWidth::Word => 0xFFFF,
            AccessWidth::Long => 0xFFFF_FFFF,
        }
    }

    /// Value the data bus floats to when nothing answers
    pub fn open_bus(self) -> u32 {
        self.mask()
    }
}

/// Only the low 24 address lines are wired on the 68000
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Memory interface trait for the 68000
pub trait M68kBus {
    /// Read a value of `width` from `addr`
    fn read(&mut self, addr: u32, width: AccessWidth) -> u32;

    /// Write `value` of `width` to `addr`
    fn write(&mut self, addr: u32, width: AccessWidth, value: u32);

    fn read_byte(&mut self, addr: u32) -> u8 {
        self.read(addr, AccessWidth::Byte) as u8
    }

    fn read_word(&mut self, addr: u32) -> u16 {
        self.read(addr, AccessWidth::Word) as u16
    }

    fn write_byte(&mut self, addr: u32, value: u8) {
        self.write(addr, AccessWidth::Byte, value as u32);
    }

    fn write_word(&mut self, addr: u32, value: u16) {
        self.write(addr, AccessWidth::Word, value as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatRam {
        bytes: Vec<u8>,
    }

    impl M68kBus for FlatRam {
        fn read(&mut self, addr: u32, width: AccessWidth) -> u32 {
            let addr = (addr & ADDRESS_MASK) as usize;
            (0..width.bytes() as usize).fold(0, |acc, i| {
                (acc << 8) | self.bytes.get(addr + i).copied().unwrap_or(0xFF) as u32
            })
        }

        fn write(&mut self, addr: u32, width: AccessWidth, value: u32) {
            let addr = (addr & ADDRESS_MASK) as usize;
            let n = width.bytes() as usize;
            for i in 0..n {
                if let Some(b) = self.bytes.get_mut(addr + i) {
                    *b = (value >> (8 * (n - 1 - i))) as u8;
                }
            }
        }
    }

    #[test]
    fn test_widths() {
        assert_eq!(AccessWidth::Byte.bytes(), 1);
        assert_eq!(AccessWidth::Long.bytes(), 4);
        assert_eq!(AccessWidth::Word.open_bus(), 0xFFFF);
    }

    #[test]
    fn test_default_helpers_are_big_endian() {
        let mut ram = FlatRam { bytes: vec![0; 16] };
        ram.write_word(2, 0x1234);
        assert_eq!(ram.read_byte(2), 0x12);
        assert_eq!(ram.read_byte(3), 0x34);
        ram.write(4, AccessWidth::Long, 0xDEADBEEF);
        assert_eq!(ram.read_word(4), 0xDEAD);
        assert_eq!(ram.read_word(6), 0xBEEF);
    }
}
