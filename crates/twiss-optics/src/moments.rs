//! Conversion of accumulated power sums into central moments.

use serde::{Deserialize, Serialize};
use twiss_core::{Coordinate, CoordinateVector};

use crate::power_sums::{flat_index, PowerSums};

/// Central moments derived from a finished [`PowerSums`] tensor.
///
/// Second-order entries are unbiased sample (co)variances; fourth-order entries are
/// plain `1/n` estimates. Exponent pairs without a closed form hold zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralMoments {
    values: Vec<f64>,
    count: u64,
}

impl CentralMoments {
    /// Derives every supported central moment from the power sums.
    pub fn from_power_sums(sums: &PowerSums, offsets: &CoordinateVector, count: u64) -> Self {
        let mut values = vec![0.0; PowerSums::LEN];
        for a in Coordinate::ALL {
            for b in Coordinate::ALL {
                for (j, k) in SUPPORTED {
                    if let Some(idx) = flat_index(a.index(), b.index(), j, k) {
                        values[idx] = central_moment(sums, offsets, count, a, b, j, k);
                    }
                }
            }
        }
        Self { values, count }
    }

    /// Number of particles the moments were computed from.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the central moment for `(a, b, j, k)`.
    pub fn get(&self, a: Coordinate, b: Coordinate, j: usize, k: usize) -> f64 {
        flat_index(a.index(), b.index(), j, k)
            .map(|idx| self.values[idx])
            .unwrap_or(0.0)
    }

    /// Mean of a single coordinate.
    pub fn mean(&self, coordinate: Coordinate) -> f64 {
        self.get(coordinate, coordinate, 1, 0)
    }

    /// Unbiased variance of a single coordinate.
    pub fn variance(&self, coordinate: Coordinate) -> f64 {
        self.get(coordinate, coordinate, 2, 0)
    }

    /// Unbiased covariance of two coordinates.
    pub fn covariance(&self, a: Coordinate, b: Coordinate) -> f64 {
        self.get(a, b, 1, 1)
    }
}

/// Exponent pairs with a closed-form central moment.
const SUPPORTED: [(usize, usize); 10] = [
    (1, 0),
    (0, 1),
    (2, 0),
    (0, 2),
    (1, 1),
    (4, 0),
    (0, 4),
    (3, 1),
    (1, 3),
    (2, 2),
];

/// Computes one central moment from the power sums of pair `(a, b)`.
///
/// `count <= 1` divides by zero and yields a non-finite value for every order
/// above one.
pub fn central_moment(
    sums: &PowerSums,
    offsets: &CoordinateVector,
    count: u64,
    a: Coordinate,
    b: Coordinate,
    j: usize,
    k: usize,
) -> f64 {
    let n = count as f64;
    let s = |j: usize, k: usize| sums.get(a, b, j, k).unwrap_or(f64::NAN);

    match (j, k) {
        (1, 0) => s(1, 0) / n + offsets[a],
        (0, 1) => s(0, 1) / n + offsets[b],
        (2, 0) => (n * s(2, 0) - s(1, 0).powi(2)) / (n * (n - 1.0)),
        (0, 2) => (n * s(0, 2) - s(0, 1).powi(2)) / (n * (n - 1.0)),
        (1, 1) => (n * s(1, 1) - s(1, 0) * s(0, 1)) / (n * (n - 1.0)),
        (4, 0) => fourth(n, s(1, 0), s(2, 0), s(3, 0), s(4, 0)),
        (0, 4) => fourth(n, s(0, 1), s(0, 2), s(0, 3), s(0, 4)),
        (3, 1) => third_first(
            n,
            [s(1, 0), s(0, 1), s(1, 1), s(2, 0), s(2, 1), s(3, 0), s(3, 1)],
        ),
        (1, 3) => third_first(
            n,
            [s(0, 1), s(1, 0), s(1, 1), s(0, 2), s(1, 2), s(0, 3), s(1, 3)],
        ),
        (2, 2) => {
            let (s10, s01) = (s(1, 0), s(0, 1));
            -3.0 * s01.powi(2) * s10.powi(2) / n.powi(4)
                + s(0, 2) * s10.powi(2) / n.powi(3)
                + 4.0 * s01 * s10 * s(1, 1) / n.powi(3)
                - 2.0 * s10 * s(1, 2) / n.powi(2)
                + s01.powi(2) * s(2, 0) / n.powi(3)
                - 2.0 * s01 * s(2, 1) / n.powi(2)
                + s(2, 2) / n
        }
        _ => 0.0,
    }
}

fn fourth(n: f64, s1: f64, s2: f64, s3: f64, s4: f64) -> f64 {
    -3.0 * s1.powi(4) / n.powi(4) + 6.0 * s1.powi(2) * s2 / n.powi(3) - 4.0 * s1 * s3 / n.powi(2)
        + s4 / n
}

/// `<(u - <u>)^3 (v - <v>)>` from sums ordered as
/// `[S_u, S_v, S_uv, S_uu, S_uuv, S_uuu, S_uuuv]`.
fn third_first(n: f64, sums: [f64; 7]) -> f64 {
    let [su, sv, suv, suu, suuv, suuu, suuuv] = sums;
    -3.0 * sv * su.powi(3) / n.powi(4)
        + 3.0 * su.powi(2) * suv / n.powi(3)
        + 3.0 * sv * su * suu / n.powi(3)
        - 3.0 * su * suuv / n.powi(2)
        - sv * suuu / n.powi(2)
        + suuuv / n
}
