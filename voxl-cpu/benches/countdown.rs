use criterion::{Criterion, criterion_group, criterion_main};
use voxl_cpu::{Cpu, Ram, Register};

/// A full 255-step countdown: LOD X, then DEC X / branch-back until the
/// zero flag goes up
const PROG: [u8; 6] = [0x51, 0xFF, 0x79, 0xB4, 0x00, 0x02];

fn countdown(c: &mut Criterion) {
    let mut ram = Ram::new();
    c.bench_function("countdown", |b| {
        b.iter(|| {
            let mut cpu = Cpu::new(&PROG, &mut ram);
            while cpu.pointer() != PROG.len() as u32 {
                cpu.cycle().unwrap();
            }
            cpu.register(Register::X)
        })
    });
}

criterion_group!(benches, countdown);
criterion_main!(benches);
