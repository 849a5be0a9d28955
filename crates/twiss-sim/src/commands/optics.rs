use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::{info, warn};
use twiss_core::TwissError;
use twiss_optics::{analyse, load_config, AnalysisConfig, ParticleTable, SpeciesId};

use crate::write_json;

#[derive(Args, Debug)]
pub struct OpticsArgs {
    /// Particle file (`.json` or `.csv`).
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Destination report; a `.csv` extension writes the flat table.
    #[arg(long)]
    pub out: PathBuf,
    /// YAML analysis configuration; required unless `--species` is given.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Species name or PDG id overriding the configuration.
    #[arg(long)]
    pub species: Option<String>,
    /// Worker threads overriding the configuration.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Restrict the analysis to these samplers (repeatable).
    #[arg(long = "sampler", value_name = "NAME")]
    pub samplers: Vec<String>,
}

fn parse_species(value: &str) -> SpeciesId {
    value
        .parse::<i32>()
        .map(SpeciesId::Pdg)
        .unwrap_or_else(|_| SpeciesId::Name(value.to_string()))
}

pub fn run(args: &OpticsArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match (&args.config, &args.species) {
        (Some(path), species) => {
            let mut config = load_config(path)?;
            if let Some(species) = species {
                config.species = parse_species(species);
            }
            config
        }
        (None, Some(species)) => AnalysisConfig::new(parse_species(species)),
        (None, None) => {
            return Err(TwissError::config(
                "missing-species",
                "no particle species given for the run",
            )
            .with_hint("pass --species <name|pdg id> or a --config naming `species`")
            .into())
        }
    };
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if !args.samplers.is_empty() {
        config.samplers = args.samplers.clone();
    }

    let table = ParticleTable::load(&args.input)?;
    info!(
        "loaded {} records from {}",
        table.len(),
        args.input.display()
    );
    let report = analyse(&table, &config)?;
    let degraded = report.samplers.iter().filter(|s| !s.is_ok()).count();
    if degraded > 0 {
        warn!("{degraded} samplers have degenerate planes");
    }

    let is_csv = args
        .out
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        if let Some(parent) = args.out.parent() {
            fs::create_dir_all(parent)?;
        }
        report.save(&args.out)?;
    } else {
        write_json(&args.out, &report)?;
    }
    info!(
        "wrote report {} to {}",
        report.report_hash,
        args.out.display()
    );
    Ok(())
}
