use std::collections::BTreeMap;

use log::{info, warn};
use rayon::prelude::*;
use twiss_core::errors::TwissError;
use twiss_core::provenance::RunProvenance;
use twiss_core::ParticleSource;

use crate::accumulator::MomentAccumulator;
use crate::config::AnalysisConfig;
use crate::hash::particle_source_hash;
use crate::optics::OpticsCalculator;
use crate::report::{OpticsReport, SamplerOptics};

/// Accumulates every fill pass of one sampler.
pub fn accumulate_sampler(
    source: &dyn ParticleSource,
    sampler: &str,
    rest_mass: f64,
) -> Result<MomentAccumulator, TwissError> {
    let mut accumulator = MomentAccumulator::new(rest_mass);
    for pass in 0..source.pass_count() {
        accumulator.fill(source.records(sampler, pass)?);
    }
    Ok(accumulator)
}

/// Accumulates and finalizes one sampler.
pub fn analyse_sampler(
    source: &dyn ParticleSource,
    sampler: &str,
    rest_mass: f64,
    calculator: &OpticsCalculator,
) -> Result<SamplerOptics, TwissError> {
    let accumulator = accumulate_sampler(source, sampler, rest_mass)?;
    if accumulator.count() == 0 {
        warn!("sampler {sampler} has no accepted particles");
    }
    let moments = accumulator.central_moments();
    let planes = calculator.calculate(&moments, accumulator.reference_s());
    info!(
        "sampler {sampler}: {} particles over {} passes",
        accumulator.count(),
        accumulator.passes()
    );
    Ok(SamplerOptics {
        sampler: sampler.to_string(),
        planes: planes.to_vec(),
    })
}

fn selected_samplers(
    source: &dyn ParticleSource,
    config: &AnalysisConfig,
) -> Result<Vec<String>, TwissError> {
    if config.samplers.is_empty() {
        return Ok(source.samplers().map(str::to_string).collect());
    }
    for name in &config.samplers {
        if !source.contains(name) {
            return Err(
                TwissError::sampler("unknown-sampler", "requested sampler is not in the input")
                    .with_context("sampler", name.as_str())
                    .with_hint("omit `samplers` to analyse every sampler in the input"),
            );
        }
    }
    Ok(config.samplers.clone())
}

fn tool_versions() -> BTreeMap<String, String> {
    let mut versions = BTreeMap::new();
    versions.insert(
        "twiss-optics".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    versions
}

/// Runs the full analysis over a particle source.
///
/// The species is resolved once, samplers are analysed on a pool of
/// `config.concurrency` threads and reported in source order.
pub fn analyse(
    source: &dyn ParticleSource,
    config: &AnalysisConfig,
) -> Result<OpticsReport, TwissError> {
    config.validate()?;
    let species = config.species.resolve()?;
    if source.pass_count() == 0 || source.samplers().len() == 0 {
        return Err(TwissError::input(
            "empty-source",
            "particle input holds no samplers or no fill passes",
        ));
    }
    let samplers = selected_samplers(source, config)?;
    let calculator = OpticsCalculator::new(species.rest_mass, config.optics_options());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency.max(1))
        .build()
        .map_err(|err| TwissError::config("thread_pool", err.to_string()))?;

    info!(
        "analysing {} samplers as {} (m = {} GeV) on {} threads",
        samplers.len(),
        species.name,
        species.rest_mass,
        config.concurrency
    );
    let results: Result<Vec<_>, TwissError> = pool.install(|| {
        samplers
            .par_iter()
            .enumerate()
            .map(|(index, sampler)| {
                analyse_sampler(source, sampler, species.rest_mass, &calculator)
                    .map(|optics| (index, optics))
            })
            .collect()
    });
    let mut ordered = results?;
    ordered.sort_by_key(|(index, _)| *index);

    let provenance = RunProvenance {
        input_hash: particle_source_hash(source)?,
        species: species.name.to_string(),
        rest_mass: species.rest_mass,
        reference_emittance_used: config.optics_options().active_reference().is_some(),
        passes: source.pass_count(),
        tool_versions: tool_versions(),
    };
    OpticsReport::new(
        provenance,
        ordered.into_iter().map(|(_, optics)| optics).collect(),
    )
}
