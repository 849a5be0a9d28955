use log::debug;
use twiss_core::errors::TwissError;
use twiss_core::{Coordinate, CoordinateVector, ParticleRecord};

use crate::moments::CentralMoments;
use crate::power_sums::{power_table, PowerSums};

/// Single-pass accumulator of centered power sums for one sampler.
///
/// Offsets are captured from the first accepted particle and stay fixed until
/// [`MomentAccumulator::reset`]. The reference `S` is taken from the first
/// accepted particle of every fill pass.
#[derive(Debug, Clone)]
pub struct MomentAccumulator {
    rest_mass: f64,
    offsets: Option<CoordinateVector>,
    sums: PowerSums,
    count: u64,
    reference_s: f64,
    awaiting_reference: bool,
    passes: usize,
}

impl MomentAccumulator {
    /// Creates an empty accumulator deriving momenta with `rest_mass` (GeV).
    pub fn new(rest_mass: f64) -> Self {
        Self {
            rest_mass,
            offsets: None,
            sums: PowerSums::zeroed(),
            count: 0,
            reference_s: 0.0,
            awaiting_reference: true,
            passes: 0,
        }
    }

    /// Creates an accumulator whose offsets are fixed up front.
    ///
    /// Used for partial sums that are merged later; every partial must share the
    /// same offsets.
    pub fn with_offsets(rest_mass: f64, offsets: CoordinateVector) -> Self {
        Self {
            offsets: Some(offsets),
            ..Self::new(rest_mass)
        }
    }

    /// Rest mass used to derive momenta.
    pub fn rest_mass(&self) -> f64 {
        self.rest_mass
    }

    /// Number of accepted particles.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of fill passes started since the last reset.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Offsets used to center coordinates, once captured.
    pub fn offsets(&self) -> Option<&CoordinateVector> {
        self.offsets.as_ref()
    }

    /// Reference longitudinal position of the sampler.
    pub fn reference_s(&self) -> f64 {
        self.reference_s
    }

    /// Accumulated power sums.
    pub fn power_sums(&self) -> &PowerSums {
        &self.sums
    }

    /// Marks the start of a new fill pass.
    pub fn begin_pass(&mut self) {
        self.passes += 1;
        self.awaiting_reference = true;
    }

    /// Ingests one record; returns false when the acceptance filter rejects it.
    pub fn push(&mut self, record: &ParticleRecord) -> bool {
        if !record.is_accepted() {
            return false;
        }
        let coords = CoordinateVector::from_record(record, self.rest_mass);
        if self.awaiting_reference {
            self.reference_s = record.s;
            self.awaiting_reference = false;
        }
        let offsets = *self.offsets.get_or_insert(coords);

        let mut centered = [0.0; Coordinate::COUNT];
        for (idx, value) in centered.iter_mut().enumerate() {
            *value = coords[idx] - offsets[idx];
        }
        self.sums.add(&power_table(&centered));
        self.count += 1;
        true
    }

    /// Runs one complete fill pass and returns the number of accepted records.
    pub fn fill<'a, I>(&mut self, records: I) -> u64
    where
        I: IntoIterator<Item = &'a ParticleRecord>,
    {
        self.begin_pass();
        let before = self.count;
        let mut seen = 0usize;
        for record in records {
            seen += 1;
            self.push(record);
        }
        let accepted = self.count - before;
        debug!(
            "fill pass {} accepted {accepted} of {seen} records",
            self.passes
        );
        accepted
    }

    /// Adds the sums of another accumulator built with the same offsets.
    pub fn merge(&mut self, other: &MomentAccumulator) -> Result<(), TwissError> {
        if self.rest_mass.to_bits() != other.rest_mass.to_bits() {
            return Err(TwissError::sampler(
                "rest-mass-mismatch",
                "cannot merge sums from different species",
            )
            .with_context("left", self.rest_mass.to_string())
            .with_context("right", other.rest_mass.to_string()));
        }
        if other.count == 0 {
            return Ok(());
        }
        if self.offsets.is_none() {
            self.offsets = other.offsets;
        } else if self.offsets != other.offsets {
            return Err(TwissError::sampler(
                "offset-mismatch",
                "partial sums were centered on different offsets",
            ));
        }
        if self.count == 0 {
            self.reference_s = other.reference_s;
        }
        self.sums.merge(&other.sums);
        self.count += other.count;
        Ok(())
    }

    /// Clears offsets, sums, count and pass bookkeeping for reuse.
    pub fn reset(&mut self) {
        self.offsets = None;
        self.sums.reset();
        self.count = 0;
        self.reference_s = 0.0;
        self.awaiting_reference = true;
        self.passes = 0;
    }

    /// Derives the central moments of everything ingested so far.
    pub fn central_moments(&self) -> CentralMoments {
        let offsets = self.offsets.unwrap_or_default();
        CentralMoments::from_power_sums(&self.sums, &offsets, self.count)
    }
}
