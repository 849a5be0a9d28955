use serde::{Deserialize, Serialize};
use twiss_core::Plane;

use crate::moments::CentralMoments;

/// The three second-order moments of a plane, in matrix order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecondMoment {
    /// `<uu>`
    PositionPosition = 0,
    /// `<u'u'>`
    AngleAngle = 1,
    /// `<uu'>`
    PositionAngle = 2,
}

impl SecondMoment {
    /// All moments in matrix order.
    pub const ALL: [SecondMoment; 3] = [
        SecondMoment::PositionPosition,
        SecondMoment::AngleAngle,
        SecondMoment::PositionAngle,
    ];
}

/// Statistical covariance of the sample estimates of `<uu>, <u'u'>, <uu'>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentCovariance {
    /// Symmetric 3x3 matrix indexed by [`SecondMoment`].
    pub cells: [[f64; 3]; 3],
}

impl MomentCovariance {
    /// Builds the covariance matrix of a plane from its fourth-order moments.
    pub fn for_plane(moments: &CentralMoments, plane: Plane) -> Self {
        let mut cells = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in i..3 {
                let value = cell(moments, plane, SecondMoment::ALL[i], SecondMoment::ALL[j]);
                cells[i][j] = value;
                cells[j][i] = value;
            }
        }
        Self { cells }
    }

    /// Returns one cell.
    pub fn get(&self, row: SecondMoment, col: SecondMoment) -> f64 {
        self.cells[row as usize][col as usize]
    }
}

fn cell(moments: &CentralMoments, plane: Plane, row: SecondMoment, col: SecondMoment) -> f64 {
    use SecondMoment::*;

    let (u, up) = (plane.position(), plane.angle());
    let m = |j: usize, k: usize| moments.get(u, up, j, k);
    let n = moments.count() as f64;
    let unbiased = n * (n - 1.0);

    match (row, col) {
        (PositionPosition, PositionPosition) => {
            -(n - 3.0) * m(2, 0).powi(2) / unbiased + m(4, 0) / n
        }
        (AngleAngle, AngleAngle) => -(n - 3.0) * m(0, 2).powi(2) / unbiased + m(0, 4) / n,
        (PositionAngle, PositionAngle) => {
            -(n - 2.0) * m(1, 1).powi(2) / unbiased + m(2, 0) * m(0, 2) / unbiased + m(2, 2) / n
        }
        (PositionPosition, AngleAngle) | (AngleAngle, PositionPosition) => {
            2.0 * m(1, 1).powi(2) / unbiased + (m(2, 2) - m(2, 0) * m(0, 2)) / n
        }
        (PositionPosition, PositionAngle) | (PositionAngle, PositionPosition) => {
            -(n - 3.0) * m(2, 0) * m(1, 1) / unbiased + m(3, 1) / n
        }
        (AngleAngle, PositionAngle) | (PositionAngle, AngleAngle) => {
            -(n - 3.0) * m(0, 2) * m(1, 1) / unbiased + m(1, 3) / n
        }
    }
}
