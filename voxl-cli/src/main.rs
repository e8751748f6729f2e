use std::io::Read;
use std::path::PathBuf;

use cpu::{Cpu, Flag, Ram, Register, RAM_SIZE};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

/// VOXL program runner
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Program image to load and execute
    image: PathBuf,

    /// Parse the image as hex text instead of raw bytes
    #[clap(long)]
    hex: bool,

    /// Continue from address 0 when execution runs off the top of memory
    #[clap(long)]
    wrap: bool,

    /// Stop after this many cycles
    #[clap(long)]
    max_cycles: Option<u64>,
}

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter_or("VOXL_LOG", "info")
        .write_style_or("VOXL_LOG", "always");
    env_logger::init_from_env(env);

    let args = Args::parse();
    let mut f = std::fs::File::open(&args.image)
        .with_context(|| format!("failed to open {:?}", args.image))?;

    let mut raw = vec![];
    f.read_to_end(&mut raw).context("failed to read file")?;

    let program = if args.hex {
        decode_hex(&raw).context("failed to parse hex image")?
    } else {
        raw
    };
    if program.len() > RAM_SIZE {
        bail!(
            "program is {} bytes, but memory holds {RAM_SIZE}",
            program.len()
        );
    }

    let mut ram = Ram::new();
    let mut cpu = Cpu::new(&program, &mut ram);

    let start = std::time::Instant::now();
    let mut cycles = 0u64;
    loop {
        if let Err(e) = cpu.cycle() {
            print_state(&cpu);
            return Err(e).with_context(|| {
                format!("fault after {cycles} cycles, at {:#06x}", cpu.pointer())
            });
        }
        cycles += 1;
        if cpu.reached_end() && !args.wrap {
            info!("reached the end of memory after {cycles} cycles");
            break;
        }
        if args.max_cycles.is_some_and(|m| cycles >= m) {
            info!("stopping after {cycles} cycles");
            break;
        }
    }
    info!("ran {cycles} cycles in {:?}", start.elapsed());
    print_state(&cpu);

    Ok(())
}

/// Prints the register, flag and stack snapshot the way a debugger would
fn print_state(cpu: &Cpu) {
    println!(
        "A={:#04x} X={:#04x} Y={:#04x} Z={:#04x}",
        cpu.register(Register::A),
        cpu.register(Register::X),
        cpu.register(Register::Y),
        cpu.register(Register::Z),
    );
    println!(
        "flags: zero={} negative={} carry={} overflow={}",
        cpu.flag(Flag::Zero),
        cpu.flag(Flag::Negative),
        cpu.flag(Flag::Carry),
        cpu.flag(Flag::Overflow),
    );
    println!("pointer={:#06x} stack={} bytes", cpu.pointer(), cpu.stack().len());
}

/// Decodes an image written as hex digit pairs, the same encoding the
/// console uses for its data tables; whitespace is ignored
fn decode_hex(raw: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(raw).context("image is not valid UTF-8")?;
    let mut digits = text.chars().filter(|c| !c.is_whitespace());
    let mut out = vec![];
    while let Some(hi) = digits.next() {
        let Some(lo) = digits.next() else {
            bail!("odd number of hex digits");
        };
        let hi = hi
            .to_digit(16)
            .with_context(|| format!("invalid hex digit {hi:?}"))?;
        let lo = lo
            .to_digit(16)
            .with_context(|| format!("invalid hex digit {lo:?}"))?;
        out.push((hi << 4 | lo) as u8);
    }
    Ok(out)
}
