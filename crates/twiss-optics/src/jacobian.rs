use serde::{Deserialize, Serialize};
use twiss_core::Plane;

use crate::covariance::{MomentCovariance, SecondMoment};
use crate::optics::OpticalQuantity;

/// Moment values a plane's derivatives are evaluated at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativePoint {
    /// Plane the derivatives belong to.
    pub plane: Plane,
    /// Dispersion-corrected `<uu>`.
    pub c20: f64,
    /// Dispersion-corrected `<u'u'>`.
    pub c02: f64,
    /// Dispersion-corrected `<uu'>`.
    pub c11: f64,
    /// Emittance used by the alpha and beta formulas.
    pub emittance: f64,
    /// `sqrt(<uu>)`.
    pub sigma: f64,
    /// `sqrt(<u'u'>)`.
    pub sigma_prime: f64,
    /// Mean momentum.
    pub mean_p: f64,
    /// Momentum variance.
    pub var_p: f64,
    /// `<u, p>` covariance.
    pub cov_up: f64,
    /// `<u', p>` covariance.
    pub cov_upp: f64,
}

/// Partial derivatives of every optical output with respect to the plane's
/// second-order moments `<uu>, <u'u'>, <uu'>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivativeMatrix {
    /// One row per [`OpticalQuantity`], one column per [`SecondMoment`].
    pub rows: [[f64; 3]; OpticalQuantity::COUNT],
}

impl DerivativeMatrix {
    /// A matrix with every derivative at zero.
    pub fn zeroed() -> Self {
        Self {
            rows: [[0.0; 3]; OpticalQuantity::COUNT],
        }
    }

    /// Returns one derivative.
    pub fn get(&self, quantity: OpticalQuantity, moment: SecondMoment) -> f64 {
        self.rows[quantity.index()][moment as usize]
    }

    fn set(&mut self, quantity: OpticalQuantity, moment: SecondMoment, value: f64) {
        self.rows[quantity.index()][moment as usize] = value;
    }

    /// Evaluates the analytic derivatives at `point`.
    ///
    /// Means, `S` and the particle count do not depend on the second moments. The
    /// gamma row is left at zero: its derivative is not part of the propagation.
    pub fn at(point: &DerivativePoint) -> Self {
        use OpticalQuantity::*;
        use SecondMoment::*;

        let mut matrix = Self::zeroed();
        matrix.set(Sigma, PositionPosition, 0.5 / point.sigma);
        matrix.set(SigmaPrime, AngleAngle, 0.5 / point.sigma_prime);
        if !point.plane.is_transverse() {
            return matrix;
        }

        let DerivativePoint {
            c20, c02, c11, emittance: e, ..
        } = *point;
        let e3 = e.powi(3);

        matrix.set(Emittance, PositionPosition, c02 / (2.0 * e));
        matrix.set(Emittance, AngleAngle, c20 / (2.0 * e));
        matrix.set(Emittance, PositionAngle, -c11 / e);

        matrix.set(Alpha, PositionPosition, c11 * c02 / (2.0 * e3));
        matrix.set(Alpha, AngleAngle, c11 * c20 / (2.0 * e3));
        matrix.set(Alpha, PositionAngle, -c20 * c02 / e3);

        matrix.set(Beta, PositionPosition, 1.0 / e - c20 * c02 / (2.0 * e3));
        matrix.set(Beta, AngleAngle, -c20.powi(2) / (2.0 * e3));
        matrix.set(Beta, PositionAngle, c20 * c11 / e3);

        // Only the <uu> column is populated for dispersion. With n <= 1 or no
        // momentum spread the quotient is 0/0; it is zeroed like the dispersion
        // value itself, so the dispersion errors come out as 0 and not NaN.
        let var_p2 = point.var_p.powi(2);
        matrix.set(
            Dispersion,
            PositionPosition,
            finite_or_zero(-point.mean_p * point.cov_up / var_p2),
        );
        matrix.set(
            DispersionPrime,
            PositionPosition,
            finite_or_zero(-point.mean_p * point.cov_upp / var_p2),
        );
        matrix
    }

    /// Propagates the moment covariance into a variance per output.
    ///
    /// Terms with a zero derivative are skipped so that an unpopulated row yields
    /// exactly zero even when the covariance is non-finite. The gamma row and any
    /// zeroed dispersion derivative therefore give a variance of 0 for samples
    /// whose covariance is NaN.
    pub fn propagate(&self, covariance: &MomentCovariance) -> [f64; OpticalQuantity::COUNT] {
        let mut variances = [0.0; OpticalQuantity::COUNT];
        for (variance, row) in variances.iter_mut().zip(self.rows.iter()) {
            for (i, &di) in row.iter().enumerate() {
                if di == 0.0 {
                    continue;
                }
                for (j, &dj) in row.iter().enumerate() {
                    if dj == 0.0 {
                        continue;
                    }
                    *variance += di * dj * covariance.cells[i][j];
                }
            }
        }
        variances
    }
}

/// Zero for NaN and infinities. Applied to dispersion values and to their derivatives.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
