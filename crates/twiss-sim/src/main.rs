use std::error::Error;
use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use commands::{
    optics::{self, OpticsArgs},
    species::{self, SpeciesArgs},
    synth::{self, SynthArgs},
    version::{self, VersionArgs},
};
use flexi_logger::{Logger, LoggerHandle};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "twiss-sim", about = "Beam optics reconstruction CLI")]
struct Cli {
    /// Log filter passed to the logger (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct optical functions for every sampler of a particle file.
    Optics(OpticsArgs),
    /// Write a synthetic Gaussian particle file.
    Synth(SynthArgs),
    /// List the species and rest masses known to the engine.
    Species(SpeciesArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level)?;
    match cli.command {
        Command::Optics(args) => optics::run(&args),
        Command::Synth(args) => synth::run(&args),
        Command::Species(args) => species::run(&args),
        Command::Version(args) => version::run(&args),
    }
}

fn setup_logging(level: &str) -> Result<LoggerHandle, Box<dyn Error>> {
    let handle = Logger::try_with_str(level)?.log_to_stderr().start()?;
    Ok(handle)
}

pub(crate) fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
