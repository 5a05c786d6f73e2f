use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_core::m68k_bus::{AccessWidth, M68kBus};
use emu_core::System;
use emu_snk68::{Board, Snk68System};

/// Graphics ROMs with every pen in use so nothing is skipped
fn busy_rom(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 37 + 11) as u8).collect()
}

/// A session with a full fix layer, every sprite column populated and a
/// non-black palette
fn busy_system(board: Board) -> Snk68System {
    let mut system = Snk68System::new(board).expect("board map is valid");
    system.mount("maincpu", &[0u8; 0x400]).unwrap();
    system.mount("gfx1", &busy_rom(0x10000)).unwrap();
    system.mount("gfx2", &busy_rom(0x80000)).unwrap();

    let (video, sprites) = match board {
        Board::Pow => (0x100000, 0x200000),
        _ => (0x200000, 0x100000),
    };
    let bus = system.bus_mut();
    for i in 0..0x800u32 {
        bus.write(0x400000 + i * 2, AccessWidth::Word, i * 13);
    }
    for cell in 0..1024u32 {
        bus.write(video + cell * 4, AccessWidth::Word, cell & 0x1ff);
        bus.write(video + cell * 4 + 2, AccessWidth::Word, cell % 16);
    }
    for bank in 0..3u32 {
        for slot in 0..32u32 {
            let position = sprites + slot * 0x80 + 4 * bank;
            bus.write(position + 4, AccessWidth::Word, slot * 8 % 0x20);
            bus.write(position + 6, AccessWidth::Word, 0x100 + bank * 0x40);
            let column = sprites + 0x1000 * (bank + 1) + slot * 0x80;
            for row in 0..32u32 {
                bus.write(column + row * 4, AccessWidth::Word, 1 + (slot + row) % 0x7f);
                bus.write(column + row * 4 + 2, AccessWidth::Word, row * 3 + slot);
            }
        }
    }
    system
}

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");

    for board in [Board::Pow, Board::SearchAndRescue] {
        group.bench_with_input(BenchmarkId::new("cached", board.name()), &board, |b, &board| {
            let mut system = busy_system(board);
            b.iter(|| black_box(system.step_frame().unwrap()));
        });

        // Toggling flip screen forces the whole fix layer to be redecoded
        group.bench_with_input(BenchmarkId::new("flip", board.name()), &board, |b, &board| {
            let mut system = busy_system(board);
            let flip = match board {
                Board::Pow => 0x080006,
                _ => 0x0c0000,
            };
            let mut on = false;
            b.iter(|| {
                on = !on;
                system
                    .bus_mut()
                    .write(flip, AccessWidth::Word, if on { 0x08 } else { 0x00 });
                black_box(system.step_frame().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render_frame);
criterion_main!(benches);
