//! Graphics ROM layouts

use emu_core::ppu::tile::{decode, PlaneOffset};
use emu_core::ppu::{DecodedGfx, GfxError, GfxLayout};

/// 8x8 fix layer characters, 4bpp; two planes per byte, the other two in the
/// second half of the ROM
pub fn char_layout() -> GfxLayout {
    GfxLayout {
        width: 8,
        height: 8,
        region_split: 2,
        plane_offsets: vec![
            PlaneOffset::Bits(0),
            PlaneOffset::Bits(4),
            PlaneOffset::Fraction { part: 1, bits: 0 },
            PlaneOffset::Fraction { part: 1, bits: 4 },
        ],
        x_offsets: vec![8 * 8 + 3, 8 * 8 + 2, 8 * 8 + 1, 8 * 8, 3, 2, 1, 0],
        y_offsets: (0..8).map(|y| y * 8).collect(),
        char_increment: 16 * 8,
    }
}

/// 16x16 sprite cells, 4bpp; one plane per quarter of the ROM
pub fn sprite_layout() -> GfxLayout {
    GfxLayout {
        width: 16,
        height: 16,
        region_split: 4,
        plane_offsets: (0..4)
            .map(|part| PlaneOffset::Fraction { part, bits: 0 })
            .collect(),
        x_offsets: (0..8)
            .rev()
            .map(|x| 16 * 8 + x)
            .chain((0..8).rev())
            .collect(),
        y_offsets: (0..16).map(|y| y * 8).collect(),
        char_increment: 32 * 8,
    }
}

pub fn decode_chars(rom: &[u8]) -> Result<DecodedGfx, GfxError> {
    decode(rom, &char_layout())
}

pub fn decode_sprites(rom: &[u8]) -> Result<DecodedGfx, GfxError> {
    decode(rom, &sprite_layout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_decode() {
        // One character: 16 bytes per half
        let mut rom = vec![0u8; 32];
        // Row 0, plane 0 (pen bit 3) lights the leftmost pixel: bit offset
        // 8*8+3 is byte 8, mask 0x10
        rom[8] = 0x10;
        // Row 0, plane 2 (pen bit 1) lights the rightmost pixel: bit 0 of
        // the second half, byte 16, mask 0x80
        rom[16] = 0x80;

        let chars = decode_chars(&rom).unwrap();
        assert_eq!(chars.tile_count(), 1);
        assert_eq!(chars.pixel(0, 0, 0), 0b1000);
        assert_eq!(chars.pixel(0, 7, 0), 0b0010);
        assert_eq!(chars.pixel(0, 3, 0), 0);
        assert_eq!(chars.pen_usage(0), 0b1_0000_0101);
    }

    #[test]
    fn test_sprite_decode() {
        // One sprite: 32 bytes per quarter
        let mut rom = vec![0u8; 128];
        // Row 0 left half lives 16 bytes into the tile, pixels stored LSB first
        rom[16] = 0x01;
        // Plane 3 (pen bit 0) of the last pixel on row 15
        rom[3 * 32 + 15] = 0x80;

        let sprites = decode_sprites(&rom).unwrap();
        assert_eq!(sprites.tile_count(), 1);
        assert_eq!(sprites.tile_width(), 16);
        assert_eq!(sprites.pixel(0, 0, 0), 0b1000);
        assert_eq!(sprites.pixel(0, 15, 15), 0b0001);
    }

    #[test]
    fn test_short_roms_fail() {
        assert!(matches!(
            decode_chars(&[0u8; 8]),
            Err(GfxError::RomTooShort { .. })
        ));
        assert!(decode_sprites(&[0u8; 64]).is_err());
    }
}
