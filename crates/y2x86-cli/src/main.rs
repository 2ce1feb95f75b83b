//! y2x86 CLI - translate Y86 binaries into IA-32 machine code.

mod lift;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use y2x86::{Dialect, Translator};

#[derive(Parser)]
#[command(name = "y2x86")]
#[command(version, about = "Translate a Y86 binary into IA-32 machine code", long_about = None)]
struct Cli {
    /// Y86 binary to translate
    #[arg(short, long, value_name = "FILE")]
    binary: PathBuf,

    /// Write the translated bytes to FILE
    #[arg(short, long, value_name = "FILE")]
    write: Option<PathBuf>,

    /// Print a disassembly of the translated code
    #[arg(short = 'i', long)]
    lift: bool,

    /// Print an address / bytes / source listing
    #[arg(short, long)]
    listing: bool,

    /// How far `mrmovl` advances the decoder
    #[arg(long, value_enum, default_value_t = DialectArg::Legacy)]
    dialect: DialectArg,

    /// Load address of the translated code (hex with 0x, or decimal)
    #[arg(long, value_name = "ADDR", value_parser = parse_addr, default_value = "0")]
    base: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    /// `mrmovl` advances 4 bytes
    Legacy,
    /// `mrmovl` advances 6 bytes
    Canonical,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Legacy => Dialect::Legacy,
            DialectArg::Canonical => Dialect::Canonical,
        }
    }
}

fn parse_addr(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address `{s}`: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let source = fs::read(&cli.binary)
        .with_context(|| format!("failed to read {}", cli.binary.display()))?;
    debug!("read {} bytes from {}", source.len(), cli.binary.display());

    let mut translator = Translator::new();
    translator.dialect(cli.dialect.into()).base_address(cli.base);
    if cli.listing {
        translator.enable_listing();
    }
    let result = translator
        .translate(&source)
        .with_context(|| format!("failed to translate {}", cli.binary.display()))?;
    info!(
        "translated {} source bytes into {} bytes ({} relocations)",
        source.len(),
        result.len(),
        result.relocations().len()
    );

    if let Some(path) = &cli.write {
        fs::write(path, result.bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote {} bytes to {}", result.len(), path.display());
    }

    if cli.listing {
        print!("{}", result.listing());
    }
    if cli.lift {
        print!("{}", lift::disassemble(result.bytes(), result.base_address()));
    }
    if !cli.listing && !cli.lift {
        println!("{}", result.to_hex());
    }

    Ok(())
}
