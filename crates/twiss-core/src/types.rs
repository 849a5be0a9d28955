use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Phase-space coordinate identifiers in their fixed storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordinate {
    /// Horizontal position.
    X,
    /// Horizontal angle.
    Xp,
    /// Vertical position.
    Y,
    /// Vertical angle.
    Yp,
    /// Total momentum derived from energy and rest mass.
    P,
    /// Arrival time.
    T,
}

impl Coordinate {
    /// Number of coordinates tracked per particle.
    pub const COUNT: usize = 6;

    /// All coordinates in storage order.
    pub const ALL: [Coordinate; Coordinate::COUNT] = [
        Coordinate::X,
        Coordinate::Xp,
        Coordinate::Y,
        Coordinate::Yp,
        Coordinate::P,
        Coordinate::T,
    ];

    /// Storage index of the coordinate.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The three optical planes, each mapped onto an adjacent coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    /// `x, x'` pair.
    Horizontal,
    /// `y, y'` pair.
    Vertical,
    /// `p, t` pair.
    Longitudinal,
}

impl Plane {
    /// All planes in result order.
    pub const ALL: [Plane; 3] = [Plane::Horizontal, Plane::Vertical, Plane::Longitudinal];

    /// Position-like coordinate of the plane.
    pub const fn position(self) -> Coordinate {
        match self {
            Plane::Horizontal => Coordinate::X,
            Plane::Vertical => Coordinate::Y,
            Plane::Longitudinal => Coordinate::P,
        }
    }

    /// Angle-like coordinate of the plane.
    pub const fn angle(self) -> Coordinate {
        match self {
            Plane::Horizontal => Coordinate::Xp,
            Plane::Vertical => Coordinate::Yp,
            Plane::Longitudinal => Coordinate::T,
        }
    }

    /// Whether Twiss parameters and dispersion are defined for the plane.
    pub const fn is_transverse(self) -> bool {
        !matches!(self, Plane::Longitudinal)
    }

    /// Short label used in tabular output.
    pub const fn label(self) -> &'static str {
        match self {
            Plane::Horizontal => "x",
            Plane::Vertical => "y",
            Plane::Longitudinal => "z",
        }
    }
}

/// A single particle as recorded by a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Track identifier of the parent; zero marks a primary.
    #[serde(default)]
    pub parent_id: i32,
    /// Turn index for circular machines (1 = first pass).
    #[serde(default = "ParticleRecord::default_turn")]
    pub turn: i32,
    /// Longitudinal direction cosine.
    pub zp: f64,
    /// Horizontal position in m.
    pub x: f64,
    /// Horizontal angle in rad.
    pub xp: f64,
    /// Vertical position in m.
    pub y: f64,
    /// Vertical angle in rad.
    pub yp: f64,
    /// Total energy in GeV.
    pub energy: f64,
    /// Arrival time in ns.
    pub t: f64,
    /// Curvilinear position of the sampler in m.
    #[serde(default)]
    pub s: f64,
}

impl ParticleRecord {
    const fn default_turn() -> i32 {
        1
    }

    /// Builds a forward-going primary on its first turn.
    pub fn primary(x: f64, xp: f64, y: f64, yp: f64, energy: f64, t: f64, s: f64) -> Self {
        Self {
            parent_id: 0,
            turn: 1,
            zp: 1.0,
            x,
            xp,
            y,
            yp,
            energy,
            t,
            s,
        }
    }

    /// Returns true for primaries on their first turn moving downstream.
    pub fn is_accepted(&self) -> bool {
        self.parent_id == 0 && self.turn <= 1 && self.zp > 0.0
    }
}

/// Six-component phase-space vector `x, x', y, y', p, t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CoordinateVector(pub [f64; Coordinate::COUNT]);

impl CoordinateVector {
    /// Derives the coordinate vector of a record; momentum is `sqrt(E^2 - m^2)`.
    pub fn from_record(record: &ParticleRecord, rest_mass: f64) -> Self {
        let momentum = (record.energy * record.energy - rest_mass * rest_mass).sqrt();
        Self([
            record.x,
            record.xp,
            record.y,
            record.yp,
            momentum,
            record.t,
        ])
    }

    /// Returns the raw components.
    pub fn as_array(&self) -> &[f64; Coordinate::COUNT] {
        &self.0
    }
}

impl Index<Coordinate> for CoordinateVector {
    type Output = f64;

    fn index(&self, coordinate: Coordinate) -> &f64 {
        &self.0[coordinate.index()]
    }
}

impl Index<usize> for CoordinateVector {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.0[idx]
    }
}

/// Externally supplied emittances that may replace the computed ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ReferenceEmittance {
    /// Horizontal emittance in m rad.
    pub emittance_x: f64,
    /// Vertical emittance in m rad.
    pub emittance_y: f64,
    /// Horizontal emittance uncertainty.
    pub error_emittance_x: f64,
    /// Vertical emittance uncertainty.
    pub error_emittance_y: f64,
}

impl ReferenceEmittance {
    /// True when all four components are zero.
    pub fn is_zero(&self) -> bool {
        [
            self.emittance_x,
            self.emittance_y,
            self.error_emittance_x,
            self.error_emittance_y,
        ]
        .iter()
        .all(|value| *value == 0.0)
    }

    /// Reference emittance for a plane; always zero for the longitudinal plane.
    pub fn emittance(&self, plane: Plane) -> f64 {
        match plane {
            Plane::Horizontal => self.emittance_x,
            Plane::Vertical => self.emittance_y,
            Plane::Longitudinal => 0.0,
        }
    }

    /// Reference emittance uncertainty for a plane.
    pub fn error(&self, plane: Plane) -> f64 {
        match plane {
            Plane::Horizontal => self.error_emittance_x,
            Plane::Vertical => self.error_emittance_y,
            Plane::Longitudinal => 0.0,
        }
    }
}
