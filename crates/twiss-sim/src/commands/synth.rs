use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::info;
use twiss_core::derive_substream_seed;
use twiss_optics::species::by_name;
use twiss_optics::{generate, BeamSpec, ParticleTable, PlaneTwiss};

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Destination particle file (`.json` or `.csv`).
    #[arg(long)]
    pub out: PathBuf,
    /// Sampler names to populate (repeatable).
    #[arg(long = "sampler", value_name = "NAME", default_values_t = vec!["sampler".to_string()])]
    pub samplers: Vec<String>,
    /// Number of fill passes per sampler.
    #[arg(long, default_value_t = 1)]
    pub passes: usize,
    /// Particles per sampler and pass.
    #[arg(long, default_value_t = 10_000)]
    pub particles: usize,
    /// Master seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Species name used to convert momentum to energy.
    #[arg(long, default_value = "proton")]
    pub species: String,
    /// Reference total energy in GeV.
    #[arg(long, default_value_t = 10.0)]
    pub energy: f64,
    /// Relative momentum spread.
    #[arg(long, default_value_t = 0.0)]
    pub momentum_spread: f64,
    /// Horizontal emittance in m rad.
    #[arg(long, default_value_t = 1e-6)]
    pub emittance: f64,
    /// Horizontal and vertical alpha.
    #[arg(long, default_value_t = 0.0)]
    pub alpha: f64,
    /// Horizontal and vertical beta in m.
    #[arg(long, default_value_t = 10.0)]
    pub beta: f64,
    /// Horizontal dispersion in m.
    #[arg(long, default_value_t = 0.0)]
    pub dispersion: f64,
}

pub fn run(args: &SynthArgs) -> Result<(), Box<dyn Error>> {
    let species = by_name(&args.species)?;
    let plane = PlaneTwiss {
        emittance: args.emittance,
        alpha: args.alpha,
        beta: args.beta,
        dispersion: 0.0,
        dispersion_prime: 0.0,
    };
    let mut table = ParticleTable::new();
    for (index, sampler) in args.samplers.iter().enumerate() {
        for pass in 0..args.passes {
            let stream = (index * args.passes + pass) as u64;
            let spec = BeamSpec {
                particles: args.particles,
                seed: derive_substream_seed(args.seed, stream),
                horizontal: PlaneTwiss {
                    dispersion: args.dispersion,
                    ..plane
                },
                vertical: plane,
                energy: args.energy,
                relative_momentum_spread: args.momentum_spread,
                time_spread: 0.0,
                s: index as f64,
            };
            table.extend(pass, sampler, generate(&spec, species.rest_mass)?)?;
        }
    }
    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)?;
    }
    table.save(&args.out)?;
    info!(
        "wrote {} {} records to {}",
        table.len(),
        species.name,
        args.out.display()
    );
    Ok(())
}
