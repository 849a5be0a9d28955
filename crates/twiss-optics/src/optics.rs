//! Optical function derivation and uncertainty assignment.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use twiss_core::{Coordinate, Plane, ReferenceEmittance};

use crate::covariance::MomentCovariance;
use crate::jacobian::{finite_or_zero, DerivativeMatrix, DerivativePoint};
use crate::kinematics::momentum_to_energy;
use crate::moments::CentralMoments;

/// The twelve per-plane outputs in their fixed result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpticalQuantity {
    /// Geometric emittance.
    Emittance,
    /// Twiss alpha.
    Alpha,
    /// Twiss beta.
    Beta,
    /// Twiss gamma.
    Gamma,
    /// Dispersion.
    Dispersion,
    /// Dispersion prime.
    DispersionPrime,
    /// Mean position (mean energy longitudinally).
    Mean,
    /// Mean angle (mean time longitudinally).
    MeanPrime,
    /// Position spread (energy spread longitudinally).
    Sigma,
    /// Angle spread (time spread longitudinally).
    SigmaPrime,
    /// Reference longitudinal position of the sampler.
    S,
    /// Number of accepted particles.
    Particles,
}

impl OpticalQuantity {
    /// Number of outputs per plane.
    pub const COUNT: usize = 12;

    /// All outputs in result order.
    pub const ALL: [OpticalQuantity; OpticalQuantity::COUNT] = [
        OpticalQuantity::Emittance,
        OpticalQuantity::Alpha,
        OpticalQuantity::Beta,
        OpticalQuantity::Gamma,
        OpticalQuantity::Dispersion,
        OpticalQuantity::DispersionPrime,
        OpticalQuantity::Mean,
        OpticalQuantity::MeanPrime,
        OpticalQuantity::Sigma,
        OpticalQuantity::SigmaPrime,
        OpticalQuantity::S,
        OpticalQuantity::Particles,
    ];

    /// Position in the result tuple.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column name used in tabular output.
    pub const fn label(self) -> &'static str {
        match self {
            OpticalQuantity::Emittance => "emitt",
            OpticalQuantity::Alpha => "alpha",
            OpticalQuantity::Beta => "beta",
            OpticalQuantity::Gamma => "gamma",
            OpticalQuantity::Dispersion => "disp",
            OpticalQuantity::DispersionPrime => "disp_p",
            OpticalQuantity::Mean => "mean",
            OpticalQuantity::MeanPrime => "mean_p",
            OpticalQuantity::Sigma => "sigma",
            OpticalQuantity::SigmaPrime => "sigma_p",
            OpticalQuantity::S => "s",
            OpticalQuantity::Particles => "n",
        }
    }
}

/// One value per [`OpticalQuantity`]; used for both results and their errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct OpticalFunctions {
    /// Geometric emittance.
    #[serde(with = "crate::serde::non_finite")]
    pub emittance: f64,
    /// Twiss alpha.
    #[serde(with = "crate::serde::non_finite")]
    pub alpha: f64,
    /// Twiss beta.
    #[serde(with = "crate::serde::non_finite")]
    pub beta: f64,
    /// Twiss gamma.
    #[serde(with = "crate::serde::non_finite")]
    pub gamma: f64,
    /// Dispersion.
    #[serde(with = "crate::serde::non_finite")]
    pub dispersion: f64,
    /// Dispersion prime.
    #[serde(with = "crate::serde::non_finite")]
    pub dispersion_prime: f64,
    /// Mean position, or mean energy for the longitudinal plane.
    #[serde(with = "crate::serde::non_finite")]
    pub mean: f64,
    /// Mean angle, or mean time for the longitudinal plane.
    #[serde(with = "crate::serde::non_finite")]
    pub mean_prime: f64,
    /// Position spread, or energy spread for the longitudinal plane.
    #[serde(with = "crate::serde::non_finite")]
    pub sigma: f64,
    /// Angle spread, or time spread for the longitudinal plane.
    #[serde(with = "crate::serde::non_finite")]
    pub sigma_prime: f64,
    /// Reference longitudinal position.
    #[serde(with = "crate::serde::non_finite")]
    pub s: f64,
    /// Accepted particle count.
    #[serde(with = "crate::serde::non_finite")]
    pub particles: f64,
}

impl OpticalFunctions {
    /// Returns the value of one quantity.
    pub fn get(&self, quantity: OpticalQuantity) -> f64 {
        self.to_array()[quantity.index()]
    }

    /// Values in result order.
    pub fn to_array(&self) -> [f64; OpticalQuantity::COUNT] {
        [
            self.emittance,
            self.alpha,
            self.beta,
            self.gamma,
            self.dispersion,
            self.dispersion_prime,
            self.mean,
            self.mean_prime,
            self.sigma,
            self.sigma_prime,
            self.s,
            self.particles,
        ]
    }
}

/// Tagged outcome of a plane, reported alongside the untouched numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaneStatus {
    /// Every value is finite.
    Ok,
    /// Fewer than two particles; variance-type results are non-finite.
    InsufficientStatistics,
    /// Non-finite Twiss parameters or spreads from a degenerate distribution.
    IllConditioned,
}

/// Optical functions and their standard errors for one plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneOptics {
    /// Plane the values belong to.
    pub plane: Plane,
    /// Reconstructed optical functions.
    pub values: OpticalFunctions,
    /// Standard errors; `s` and `particles` are always zero.
    pub errors: OpticalFunctions,
    /// Normalised x-y correlation; zero outside the horizontal plane.
    #[serde(with = "crate::serde::non_finite")]
    pub xy_correlation: f64,
    /// Tagged outcome.
    pub status: PlaneStatus,
}

/// Options controlling how the calculator treats emittance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct OpticsOptions {
    /// Externally supplied emittances and errors.
    #[serde(default)]
    pub reference_emittance: Option<ReferenceEmittance>,
    /// Trust the reference emittance over the computed one.
    #[serde(default)]
    pub use_reference_emittance: bool,
}

impl OpticsOptions {
    /// The reference vector, when the override applies to this run.
    ///
    /// Decided once for the whole vector: the flag must be set and at least one
    /// component non-zero. Both transverse planes then take their value and error
    /// verbatim, zeros included.
    pub fn active_reference(&self) -> Option<ReferenceEmittance> {
        if !self.use_reference_emittance {
            return None;
        }
        self.reference_emittance.filter(|reference| !reference.is_zero())
    }

    fn reference_for(&self, plane: Plane) -> Option<(f64, f64)> {
        if !plane.is_transverse() {
            return None;
        }
        self.active_reference()
            .map(|reference| (reference.emittance(plane), reference.error(plane)))
    }
}

/// Turns central moments into optical functions with propagated errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticsCalculator {
    rest_mass: f64,
    options: OpticsOptions,
}

impl OpticsCalculator {
    /// Creates a calculator for a species of `rest_mass` GeV.
    pub fn new(rest_mass: f64, options: OpticsOptions) -> Self {
        Self { rest_mass, options }
    }

    /// Computes all three planes, in [`Plane::ALL`] order.
    pub fn calculate(&self, moments: &CentralMoments, reference_s: f64) -> [PlaneOptics; 3] {
        let planes = Plane::ALL.map(|plane| self.plane(moments, plane, reference_s));
        for optics in planes.iter().filter(|optics| optics.status != PlaneStatus::Ok) {
            warn!(
                "plane {} finished as {:?} with {} particles",
                optics.plane.label(),
                optics.status,
                moments.count()
            );
        }
        planes
    }

    /// Computes a single plane.
    pub fn plane(&self, moments: &CentralMoments, plane: Plane, reference_s: f64) -> PlaneOptics {
        let (u, up) = (plane.position(), plane.angle());
        let n = moments.count() as f64;
        let m20 = moments.get(u, up, 2, 0);
        let m02 = moments.get(u, up, 0, 2);
        let m11 = moments.get(u, up, 1, 1);

        let mut values = OpticalFunctions {
            mean: moments.get(u, up, 1, 0),
            mean_prime: moments.get(u, up, 0, 1),
            sigma: m20.sqrt(),
            sigma_prime: m02.sqrt(),
            s: reference_s,
            particles: n,
            ..OpticalFunctions::default()
        };

        let mean_p = moments.mean(Coordinate::P);
        let var_p = moments.variance(Coordinate::P);
        let cov_up = moments.covariance(u, Coordinate::P);
        let cov_upp = moments.covariance(up, Coordinate::P);
        let mut point = DerivativePoint {
            plane,
            c20: m20,
            c02: m02,
            c11: m11,
            emittance: 0.0,
            sigma: values.sigma,
            sigma_prime: values.sigma_prime,
            mean_p,
            var_p,
            cov_up,
            cov_upp,
        };

        let reference = self.options.reference_for(plane);
        if plane.is_transverse() {
            let dispersion = finite_or_zero(mean_p * cov_up / var_p);
            let dispersion_prime = finite_or_zero(mean_p * cov_upp / var_p);
            let spread = var_p / mean_p.powi(2);

            let c20 = m20 + dispersion.powi(2) * spread - 2.0 * dispersion * cov_up / mean_p;
            let c02 = m02 + dispersion_prime.powi(2) * spread
                - 2.0 * dispersion_prime * cov_upp / mean_p;
            let c11 = m11 + dispersion * dispersion_prime * spread
                - dispersion * cov_upp / mean_p
                - dispersion_prime * cov_up / mean_p;

            let emittance = match reference {
                Some((emittance, _)) => emittance,
                None => (c20 * c02 - c11.powi(2)).sqrt(),
            };
            values.emittance = emittance;
            values.alpha = -c11 / emittance;
            values.beta = c20 / emittance;
            values.gamma = (1.0 + values.alpha.powi(2)) / values.beta;
            values.dispersion = dispersion;
            values.dispersion_prime = dispersion_prime;

            point.c20 = c20;
            point.c02 = c02;
            point.c11 = c11;
            point.emittance = emittance;
        }

        let covariance = MomentCovariance::for_plane(moments, plane);
        let variances = DerivativeMatrix::at(&point).propagate(&covariance);
        let errors = assign_errors(&values, &variances, reference.map(|(_, error)| error));

        let xy_correlation = if plane == Plane::Horizontal {
            moments.get(Coordinate::X, Coordinate::Y, 1, 1)
                / (moments.get(Coordinate::X, Coordinate::Y, 2, 0)
                    * moments.get(Coordinate::X, Coordinate::Y, 0, 2))
                .sqrt()
        } else {
            0.0
        };

        if plane == Plane::Longitudinal {
            let (mean_e, sigma_e) = momentum_to_energy(values.mean, values.sigma, self.rest_mass);
            values.mean = mean_e;
            values.sigma = sigma_e;
        }

        let status = classify(&values, moments.count());
        debug!(
            "plane {} emittance {:e} beta {:e} status {:?}",
            plane.label(),
            values.emittance,
            values.beta,
            status
        );
        PlaneOptics {
            plane,
            values,
            errors,
            xy_correlation,
            status,
        }
    }
}

fn assign_errors(
    values: &OpticalFunctions,
    variances: &[f64; OpticalQuantity::COUNT],
    reference_error: Option<f64>,
) -> OpticalFunctions {
    let n = values.particles;
    let spread = |quantity: OpticalQuantity| variances[quantity.index()].sqrt();
    OpticalFunctions {
        emittance: reference_error.unwrap_or_else(|| spread(OpticalQuantity::Emittance)),
        alpha: spread(OpticalQuantity::Alpha),
        beta: spread(OpticalQuantity::Beta),
        gamma: spread(OpticalQuantity::Gamma),
        dispersion: spread(OpticalQuantity::Dispersion),
        dispersion_prime: spread(OpticalQuantity::DispersionPrime),
        mean: values.sigma / n.sqrt(),
        mean_prime: values.sigma_prime / n.sqrt(),
        sigma: spread(OpticalQuantity::Sigma),
        sigma_prime: spread(OpticalQuantity::SigmaPrime),
        s: 0.0,
        particles: 0.0,
    }
}

fn classify(values: &OpticalFunctions, count: u64) -> PlaneStatus {
    if count <= 1 {
        return PlaneStatus::InsufficientStatistics;
    }
    let finite = values.to_array().iter().all(|value| value.is_finite());
    if finite {
        PlaneStatus::Ok
    } else {
        PlaneStatus::IllConditioned
    }
}
