//! 68000 memory bus of the SNK 68000 boards
//!
//! Every transaction is looked up in the board's [`AddressMap`] and routed to
//! ROM, one of the RAM regions or a port handler. Nothing the CPU does on the
//! bus can fail: unmapped reads float high and unmapped writes vanish.

use std::cell::RefCell;
use std::rc::Rc;

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::m68k_bus::{AccessWidth, M68kBus, ADDRESS_MASK};

use crate::board::Board;
use crate::input::{InputPorts, DIAL_1, DIAL_2};
use crate::memory::{read_mirrored, Regions, SessionState};
use crate::memory_map::{
    AddressMap, Direction, MapError, MapKind, ReadHandler, Region, WriteHandler,
};
use crate::sound::SoundLink;

/// Main CPU bus
///
/// Memory map (P.O.W.; the later boards swap video and sprite RAM and add
/// protection and dials):
/// - 0x000000-0x03FFFF: program ROM
/// - 0x040000-0x043FFF: work RAM
/// - 0x080000: controls / sound command
/// - 0x0F0000, 0x0F0008: dip switches
/// - 0x100000-0x100FFF: fix layer RAM
/// - 0x200000-0x207FFF: sprite RAM
/// - 0x400000-0x400FFF: palette RAM
pub struct Snk68Bus {
    board: Board,
    map: AddressMap,

    // Program ROM and optional extra code banks
    rom: Vec<u8>,
    banks: Vec<Vec<u8>>,

    regions: Regions,
    state: SessionState,
    inputs: InputPorts,

    // Shared with the sound CPU
    sound: Rc<RefCell<dyn SoundLink>>,
}

impl Snk68Bus {
    pub fn new(board: Board, sound: Rc<RefCell<dyn SoundLink>>) -> Result<Self, MapError> {
        let map = AddressMap::for_board(board)?;
        Ok(Self {
            board,
            map,
            rom: Vec::new(),
            banks: Vec::new(),
            regions: Regions::new(),
            state: SessionState::default(),
            inputs: InputPorts::new(),
            sound,
        })
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn map(&self) -> &AddressMap {
        &self.map
    }

    pub fn set_rom(&mut self, rom: Vec<u8>) {
        self.rom = rom;
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    /// Install an extra code bank; an empty vector removes its contents
    pub fn set_bank(&mut self, bank: usize, data: Vec<u8>) {
        if self.banks.len() <= bank {
            self.banks.resize_with(bank + 1, Vec::new);
        }
        self.banks[bank] = data;
    }

    pub fn bank(&self, bank: usize) -> Option<&[u8]> {
        self.banks
            .get(bank)
            .filter(|data| !data.is_empty())
            .map(Vec::as_slice)
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn regions_mut(&mut self) -> &mut Regions {
        &mut self.regions
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Regions and latches together, for the video hardware
    pub fn video_view(&mut self) -> (&mut Regions, &SessionState) {
        (&mut self.regions, &self.state)
    }

    pub fn inputs(&self) -> &InputPorts {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut InputPorts {
        &mut self.inputs
    }

    /// Clear memory and latches; ROMs and inputs are kept
    pub fn reset(&mut self) {
        self.regions.clear();
        self.state = SessionState::default();
    }

    fn read_region(&self, region: Region, offset: u32, width: AccessWidth) -> u32 {
        match region {
            Region::WorkRam => self.regions.work_ram.read(offset, width),
            Region::VideoRam => self.regions.video.read(offset, width),
            Region::SpriteRam => self.regions.sprites.read(offset, width),
            Region::PaletteRam => self.regions.palette.read(offset, width),
        }
    }

    fn write_region(&mut self, region: Region, offset: u32, width: AccessWidth, value: u32) {
        match region {
            Region::WorkRam => self.regions.work_ram.write(offset, width, value),
            Region::VideoRam => self.regions.video.write(offset, width, value),
            Region::SpriteRam => self.regions.sprites.write(offset, width, value),
            Region::PaletteRam => self.regions.palette.write(offset, width, value),
        }
    }

    /// 16-bit value a read handler drives for the word at `offset`
    fn handler_word(&self, handler: ReadHandler, offset: u32) -> u16 {
        let inputs = &self.inputs;
        match handler {
            ReadHandler::ControlPorts => inputs.get(0) as u16 | (inputs.get(1) as u16) << 8,
            ReadHandler::Control2 => inputs.get(2) as u16,
            ReadHandler::DipSwitch(port) => (inputs.get(port) as u16) << 8,
            ReadHandler::Dial1 => (inputs.rotary(DIAL_1) << 8) & 0xff00,
            ReadHandler::Dial2 => (inputs.rotary(DIAL_2) << 8) & 0xff00,
            ReadHandler::DialLowBits => {
                let dial1 = inputs.rotary(DIAL_1) as u32;
                let dial2 = inputs.rotary(DIAL_2) as u32;
                (((dial2 << 4) & 0xf000) + (dial1 & 0x0f00)) as u16
            }
            ReadHandler::ProtectedControls => {
                (inputs.get((offset / 2) as usize) ^ self.state.invert) as u16
            }
            ReadHandler::SoundStatus => 0x0001,
            ReadHandler::IrqAck => 0,
        }
    }

    fn read_handler(&self, handler: ReadHandler, offset: u32, width: AccessWidth) -> u32 {
        let word = offset & !1;
        match width {
            AccessWidth::Byte => {
                let value = self.handler_word(handler, word);
                if offset & 1 == 0 {
                    (value >> 8) as u32
                } else {
                    (value & 0xff) as u32
                }
            }
            AccessWidth::Word => self.handler_word(handler, word) as u32,
            AccessWidth::Long => {
                let high = self.handler_word(handler, word) as u32;
                let low = self.handler_word(handler, word + 2) as u32;
                high << 16 | low
            }
        }
    }

    fn write_handler(&mut self, handler: WriteHandler, offset: u32, width: AccessWidth, value: u32) {
        let data = data_word(offset, width, value);
        match handler {
            WriteHandler::SoundKick => {
                let mut sound = self.sound.borrow_mut();
                sound.write_latch((data >> 8) as u8);
                sound.raise_nmi();
            }
            WriteHandler::FlipScreen => {
                let flip_screen = data & 0x08 != 0;
                let sprite_flip = data & 0x04 != 0;
                if flip_screen != self.state.flip_screen {
                    self.regions.video.mark_all_dirty();
                }
                if flip_screen != self.state.flip_screen || sprite_flip != self.state.sprite_flip {
                    log(LogCategory::Video, LogLevel::Debug, || {
                        format!(
                            "Video: flip screen {} sprite flip {}",
                            flip_screen, sprite_flip
                        )
                    });
                }
                self.state.flip_screen = flip_screen;
                self.state.sprite_flip = sprite_flip;
            }
            WriteHandler::Protection => {
                let upper = match width {
                    AccessWidth::Long => value >> 16,
                    _ => 0,
                };
                // Only full word cycles reach the latch
                if upper != 0 || width == AccessWidth::Byte {
                    return;
                }
                let invert = if value & 0xff == 0x07 { 0xff } else { 0x00 };
                if invert != self.state.invert {
                    log(LogCategory::Input, LogLevel::Debug, || {
                        format!("Input: control inversion {:02X}", invert)
                    });
                }
                self.state.invert = invert;
            }
        }
    }
}

/// The 16-bit data bus contents of a handler write
fn data_word(offset: u32, width: AccessWidth, value: u32) -> u16 {
    match width {
        AccessWidth::Byte if offset & 1 == 0 => ((value & 0xff) as u16) << 8,
        AccessWidth::Byte => (value & 0xff) as u16,
        AccessWidth::Word => value as u16,
        AccessWidth::Long => (value >> 16) as u16,
    }
}

impl M68kBus for Snk68Bus {
    fn read(&mut self, addr: u32, width: AccessWidth) -> u32 {
        let addr = addr & ADDRESS_MASK;
        let Some(entry) = self.map.lookup(Direction::Read, addr).copied() else {
            log(LogCategory::Bus, LogLevel::Trace, || {
                format!("Bus: unmapped read {:06X}", addr)
            });
            return width.open_bus();
        };

        let offset = addr - entry.start;
        let value = match entry.kind {
            MapKind::Rom => read_mirrored(&self.rom, offset, width),
            MapKind::BankedRom(bank) => self
                .banks
                .get(bank)
                .and_then(|data| read_mirrored(data, offset, width)),
            MapKind::Ram(region) => Some(self.read_region(region, offset, width)),
            MapKind::Read(handler) => Some(self.read_handler(handler, offset, width)),
            MapKind::Write(_) | MapKind::Nop => None,
        };
        value.unwrap_or_else(|| width.open_bus())
    }

    fn write(&mut self, addr: u32, width: AccessWidth, value: u32) {
        let addr = addr & ADDRESS_MASK;
        let value = value & width.mask();
        let Some(entry) = self.map.lookup(Direction::Write, addr).copied() else {
            log(LogCategory::Bus, LogLevel::Trace, || {
                format!("Bus: unmapped write {:06X} <- {:X}", addr, value)
            });
            return;
        };

        let offset = addr - entry.start;
        match entry.kind {
            MapKind::Ram(region) => self.write_region(region, offset, width, value),
            MapKind::Write(handler) => self.write_handler(handler, offset, width, value),
            MapKind::Rom | MapKind::BankedRom(_) => {
                log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("Bus: ROM write ignored {:06X}", addr)
                });
            }
            MapKind::Read(_) | MapKind::Nop => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::DIP_SWITCH_1;
    use crate::sound::SoundLatch;
    use emu_core::ppu::IndexedPalette;

    fn bus_for(board: Board) -> (Snk68Bus, Rc<RefCell<SoundLatch>>) {
        let sound = Rc::new(RefCell::new(SoundLatch::new()));
        let bus = Snk68Bus::new(board, sound.clone()).unwrap();
        (bus, sound)
    }

    #[test]
    fn test_open_bus_per_width() {
        let (mut bus, _) = bus_for(Board::Pow);
        assert_eq!(bus.read(0x500000, AccessWidth::Byte), 0xff);
        assert_eq!(bus.read(0x500000, AccessWidth::Word), 0xffff);
        assert_eq!(bus.read(0x500000, AccessWidth::Long), 0xffff_ffff);
    }

    #[test]
    fn test_unmapped_write_changes_nothing() {
        let (mut bus, _) = bus_for(Board::Pow);
        let before = bus.regions().clone();
        bus.write(0x500000, AccessWidth::Long, 0x1234_5678);
        bus.write(0x0c8000, AccessWidth::Word, 0x1234);
        assert_eq!(bus.regions().work_ram.as_slice(), before.work_ram.as_slice());
        assert_eq!(*bus.state(), SessionState::default());
    }

    #[test]
    fn test_rom_reads_and_ignores_writes() {
        let (mut bus, _) = bus_for(Board::Pow);
        bus.set_rom(vec![0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
        assert_eq!(bus.read(0x000002, AccessWidth::Word), 0x0203);
        assert_eq!(bus.read(0x000004, AccessWidth::Long), 0x0405_0607);
        bus.write(0x000002, AccessWidth::Word, 0xffff);
        assert_eq!(bus.read(0x000002, AccessWidth::Word), 0x0203);
        // Mirrored over the mapped range
        assert_eq!(bus.read(0x000009, AccessWidth::Byte), 0x01);
    }

    #[test]
    fn test_work_ram_mirrors_and_address_wraps() {
        let (mut bus, _) = bus_for(Board::Ikari3);
        bus.write(0x040010, AccessWidth::Word, 0xBEEF);
        assert_eq!(bus.read(0x040010, AccessWidth::Word), 0xBEEF);
        assert_eq!(bus.read(0x01040010, AccessWidth::Word), 0xBEEF);
    }

    #[test]
    fn test_sound_kick_latches_high_byte() {
        let (mut bus, sound) = bus_for(Board::Pow);
        bus.write(0x080000, AccessWidth::Word, 0x4200);
        assert_eq!(sound.borrow().latch(), 0x42);
        assert!(sound.borrow_mut().take_nmi());

        bus.write(0x080000, AccessWidth::Byte, 0x17);
        assert_eq!(sound.borrow().latch(), 0x17);
        assert!(sound.borrow().nmi_pending());
    }

    #[test]
    fn test_pow_flip_screen_marks_tiles_dirty() {
        let (mut bus, _) = bus_for(Board::Pow);
        for cell in 0..crate::memory::TILE_CELLS {
            bus.regions_mut().video.take_dirty(cell);
        }
        bus.write(0x080006, AccessWidth::Word, 0x0004);
        assert!(bus.state().sprite_flip);
        assert!(!bus.state().flip_screen);
        assert!(!bus.regions().video.is_dirty(10));

        bus.write(0x080006, AccessWidth::Word, 0x0008);
        assert!(bus.state().flip_screen);
        assert!(!bus.state().sprite_flip);
        assert!(bus.regions().video.is_dirty(10));
    }

    #[test]
    fn test_flip_screen_on_later_boards() {
        let (mut bus, _) = bus_for(Board::StreetSmart);
        bus.write(0x0c0001, AccessWidth::Byte, 0x0c);
        assert!(bus.state().flip_screen);
        assert!(bus.state().sprite_flip);
    }

    #[test]
    fn test_protection_unlock_and_guard() {
        let (mut bus, _) = bus_for(Board::Ikari3);
        bus.inputs_mut().set(1, 0x12);

        bus.write(0x080006, AccessWidth::Word, 0x0007);
        assert_eq!(bus.state().invert, 0xff);
        assert_eq!(bus.read(0x080002, AccessWidth::Word), 0x12 ^ 0xff);

        // Upper half non-zero leaves the mask alone
        bus.write(0x080006, AccessWidth::Long, 0x0001_0000);
        assert_eq!(bus.state().invert, 0xff);

        bus.write(0x080006, AccessWidth::Long, 0x0000_0003);
        assert_eq!(bus.state().invert, 0x00);
        assert_eq!(bus.read(0x080002, AccessWidth::Word), 0x12);

        // Byte cycles on either half are ignored
        bus.write(0x080007, AccessWidth::Byte, 0x07);
        assert_eq!(bus.state().invert, 0x00);
        bus.write(0x080006, AccessWidth::Word, 0x0007);
        bus.write(0x080006, AccessWidth::Byte, 0x00);
        bus.write(0x080007, AccessWidth::Byte, 0x00);
        assert_eq!(bus.state().invert, 0xff);
    }

    #[test]
    fn test_control_and_dip_reads() {
        let (mut bus, _) = bus_for(Board::Pow);
        bus.inputs_mut().set(0, 0x34);
        bus.inputs_mut().set(1, 0x12);
        bus.inputs_mut().set(2, 0x56);
        bus.inputs_mut().set(DIP_SWITCH_1, 0xa5);
        assert_eq!(bus.read(0x080000, AccessWidth::Word), 0x1234);
        assert_eq!(bus.read(0x080000, AccessWidth::Byte), 0x12);
        assert_eq!(bus.read(0x080001, AccessWidth::Byte), 0x34);
        assert_eq!(bus.read(0x0c0000, AccessWidth::Word), 0x0056);
        assert_eq!(bus.read(0x0f0000, AccessWidth::Word), 0xa500);
        assert_eq!(bus.read(0x0f8000, AccessWidth::Word), 0x0001);
        assert_eq!(bus.read(0x0e0000, AccessWidth::Word), 0);
    }

    #[test]
    fn test_dial_reads() {
        let (mut bus, _) = bus_for(Board::SearchAndRescue);
        bus.inputs_mut().set(DIAL_1, 0);
        bus.inputs_mut().set(DIAL_2, 0xff);
        // Dial 1 at position 0, dial 2 at position 11
        assert_eq!(bus.read(0x0c0000, AccessWidth::Word), 0xfe00);
        assert_eq!(bus.read(0x0c8000, AccessWidth::Word), 0xff00);
        assert_eq!(bus.read(0x0d0000, AccessWidth::Word), 0x7000 + 0x0f00);
    }

    #[test]
    fn test_long_handler_read_combines_words() {
        let (mut bus, _) = bus_for(Board::StreetSmart);
        bus.inputs_mut().set(0, 0x11);
        bus.inputs_mut().set(1, 0x22);
        assert_eq!(bus.read(0x080000, AccessWidth::Long), 0x0011_0022);
    }

    #[test]
    fn test_regions_are_routed_per_board() {
        let (mut pow, _) = bus_for(Board::Pow);
        pow.write(0x100000, AccessWidth::Word, 0x0005);
        assert_eq!(pow.regions().video.cell_words(0), (0x0005, 0));

        let (mut sar, _) = bus_for(Board::SearchAndRescue);
        sar.write(0x200002, AccessWidth::Word, 0x0009);
        assert_eq!(sar.regions().video.cell_words(0), (0, 0x0009));
        sar.write(0x100004, AccessWidth::Word, 0x0012);
        assert_eq!(sar.regions().sprites.word(4), 0xff12);

        sar.write(0x400000, AccessWidth::Word, 0x4f00);
        assert_eq!(sar.regions().palette.colors().get_color(0), 0xFFFF0000);
        assert_eq!(sar.read(0x400000, AccessWidth::Word), 0x4f00);
    }

    #[test]
    fn test_extra_code_bank() {
        let (mut bus, _) = bus_for(Board::SearchAndRescue);
        assert_eq!(bus.read(0x300000, AccessWidth::Word), 0xffff);
        bus.set_bank(0, vec![0xAB, 0xCD]);
        assert_eq!(bus.read(0x300000, AccessWidth::Word), 0xABCD);
        assert_eq!(bus.read(0x300002, AccessWidth::Word), 0xABCD);
        assert!(bus.bank(0).is_some());
        bus.set_bank(0, Vec::new());
        assert!(bus.bank(0).is_none());
    }

    #[test]
    fn test_reset_keeps_inputs_and_rom() {
        let (mut bus, _) = bus_for(Board::Ikari3);
        bus.set_rom(vec![1, 2]);
        bus.inputs_mut().set(0, 0x5a);
        bus.write(0x080006, AccessWidth::Word, 0x0007);
        bus.write(0x040000, AccessWidth::Word, 0x1234);
        bus.reset();
        assert_eq!(bus.state().invert, 0);
        assert_eq!(bus.read(0x040000, AccessWidth::Word), 0);
        assert_eq!(bus.inputs().get(0), 0x5a);
        assert_eq!(bus.rom(), &[1, 2]);
    }
}
