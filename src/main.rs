use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use emu::config::{DisassemblerConfig, EmulatorConfig, Endianness, Processor};
use emu::cpu::emulator::{Emulator, RunOutcome};
use emu::cpu::registers::{REG_LR, REG_SP};
use emu::disassembler::disassemble_listing;
use emu::error::EmuError;
use emu::memory::image::MemoryImage;

const EXIT_BUDGET_EXHAUSTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level; traced runs print every executed instruction.
    #[arg(short, long, global = true)]
    trace: bool,

    /// Write the log to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a labelled listing of a raw program image.
    Disasm(DisasmArgs),

    /// Execute a raw program image until it returns to address 0.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Words in the image are big endian.
    #[arg(long)]
    big_endian: bool,

    /// Model the ARM8 store prefetch (PC + 8) instead of the ARM7 one.
    #[arg(long)]
    arm8: bool,
}

impl TargetArgs {
    const fn processor(&self) -> Processor {
        if self.arm8 { Processor::Arm8 } else { Processor::Arm7 }
    }

    const fn endianness(&self) -> Endianness {
        if self.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

#[derive(Args, Debug)]
struct DisasmArgs {
    file: PathBuf,

    /// Print immediates in hex.
    #[arg(long)]
    hex: bool,

    /// `offset;text` lines to interleave with the listing.
    #[arg(long)]
    comments: Option<PathBuf>,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(Args, Debug)]
struct RunArgs {
    file: PathBuf,

    /// Where the image is placed in memory.
    #[arg(long, default_value = "0x1000", value_parser = parse_u32)]
    load_address: u32,

    /// First instruction executed (defaults to the load address).
    #[arg(long, value_parser = parse_u32)]
    entry: Option<u32>,

    /// Total memory mapped from the load address, image included.
    #[arg(long, default_value = "0x10000", value_parser = parse_u32)]
    memory_size: u32,

    /// Stop after this many instructions.
    #[arg(long)]
    max_instructions: Option<u64>,

    #[command(flatten)]
    target: TargetArgs,
}

/// Decimal or `0x` prefixed hex.
fn parse_u32(s: &str) -> Result<u32, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex number '{s}': {e}"))
    } else {
        trimmed
            .parse()
            .map_err(|e| format!("invalid number '{s}': {e}"))
    }
}

/// One `offset;text` comment per line, blank lines ignored. The result is
/// sorted by offset, keeping file order for equal offsets.
fn parse_comments(text: &str) -> anyhow::Result<Vec<(u32, String)>> {
    let mut comments = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let Some((offset, comment)) = line.split_once(';') else {
            bail!("line {}: expected `offset;text`", number + 1);
        };
        let offset = parse_u32(offset)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("line {}", number + 1))?;
        comments.push((offset, comment.to_owned()));
    }

    comments.sort_by_key(|(offset, _)| *offset);
    Ok(comments)
}

/// The returned guard flushes the log file when dropped, keep it alive
/// until exit.
fn init_tracing(trace: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = if trace {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_ansi(false).with_writer(writer).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    if bytes.len() % 4 != 0 {
        return Err(EmuError::ImageNotWordSized { len: bytes.len() })
            .with_context(|| format!("loading {}", path.display()));
    }
    Ok(bytes)
}

fn disasm(args: &DisasmArgs) -> anyhow::Result<ExitCode> {
    let config = DisassemblerConfig {
        processor: args.target.processor(),
        endianness: args.target.endianness(),
        hex_immediates: args.hex,
    };

    let bytes = read_image(&args.file)?;
    let words = MemoryImage::from_bytes(0, bytes, config.endianness)?.words()?;

    let comments = match &args.comments {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            parse_comments(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Vec::new(),
    };

    tracing::info!(
        "disassembling {} words from {}",
        words.len(),
        args.file.display()
    );
    print!("{}", disassemble_listing(&config, &words, &comments));

    Ok(ExitCode::SUCCESS)
}

fn run(args: &RunArgs, trace: bool) -> anyhow::Result<ExitCode> {
    let config = EmulatorConfig {
        processor: args.target.processor(),
        endianness: args.target.endianness(),
        trace,
    };

    let mut bytes = read_image(&args.file)?;
    if bytes.len() < args.memory_size as usize {
        bytes.resize(args.memory_size as usize, 0);
    }
    let memory = MemoryImage::from_bytes(args.load_address, bytes, config.endianness)?;

    // The stack grows down from the end of memory. LR = 0 so that the
    // program's final `mov pc, lr` stops the run.
    let stack_top = (memory.end() & !3).min(u64::from(u32::MAX & !3)) as u32;
    let mut cpu = Emulator::new(config, memory);
    cpu.set_register_at(REG_SP, stack_top);
    cpu.set_register_at(REG_LR, 0);

    let outcome = cpu.run(args.entry.unwrap_or(args.load_address), args.max_instructions);

    for reg in 0..16 {
        println!("r{reg:<2} = 0x{:08x}", cpu.register_at(reg));
    }
    println!("cpsr = 0x{:08x}", u32::from(cpu.cpsr()));
    println!("executed {} instructions", outcome.executed());

    Ok(match outcome {
        RunOutcome::Terminated { .. } => ExitCode::SUCCESS,
        RunOutcome::BudgetExhausted { .. } => {
            tracing::warn!("instruction budget exhausted before the program returned");
            ExitCode::from(EXIT_BUDGET_EXHAUSTED)
        }
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(cli.trace, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("{error:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Command::Disasm(args) => disasm(args),
        Command::Run(args) => run(args, cli.trace),
    };

    result.unwrap_or_else(|error| {
        tracing::error!("{error:#}");
        ExitCode::FAILURE
    })
}
