use serde::Serialize;
use sha2::{Digest, Sha256};
use twiss_core::errors::TwissError;
use twiss_core::{ParticleRecord, ParticleSource};

use crate::serde::to_canonical_json_bytes;

/// Computes a stable SHA256 hash for the provided serializable value.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, TwissError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

fn update_record(hasher: &mut Sha256, record: &ParticleRecord) {
    hasher.update(record.parent_id.to_le_bytes());
    hasher.update(record.turn.to_le_bytes());
    for value in [
        record.zp,
        record.x,
        record.xp,
        record.y,
        record.yp,
        record.energy,
        record.t,
        record.s,
    ] {
        hasher.update(value.to_bits().to_le_bytes());
    }
}

/// Computes the canonical content hash of a particle source.
///
/// Samplers are visited in source order and passes in index order, so two
/// sources holding identical records hash identically.
pub fn particle_source_hash(source: &dyn ParticleSource) -> Result<String, TwissError> {
    let mut hasher = Sha256::new();
    let passes = source.pass_count();
    hasher.update((passes as u64).to_le_bytes());
    let samplers: Vec<&str> = source.samplers().collect();
    for sampler in samplers {
        hasher.update((sampler.len() as u64).to_le_bytes());
        hasher.update(sampler.as_bytes());
        for pass in 0..passes {
            let records = source.records(sampler, pass)?;
            hasher.update((records.len() as u64).to_le_bytes());
            for record in records {
                update_record(&mut hasher, record);
            }
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}
