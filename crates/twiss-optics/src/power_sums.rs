use serde::{Deserialize, Serialize};
use twiss_core::Coordinate;

/// Highest total order `j + k` retained in the power-sum tensor.
pub const MAX_ORDER: usize = 4;

/// Number of exponent pairs `(j, k)` with `j + k <= MAX_ORDER`.
pub const EXPONENT_PAIRS: usize = (MAX_ORDER + 1) * (MAX_ORDER + 2) / 2;

const PAIRS: usize = Coordinate::COUNT * Coordinate::COUNT;

/// Slot of `(j, k)` inside one coordinate pair block.
///
/// Pairs are laid out by total order, then by `j`: `(0,0), (0,1), (1,0), (0,2), ...`.
pub const fn exponent_slot(j: usize, k: usize) -> Option<usize> {
    let order = j + k;
    if order > MAX_ORDER {
        return None;
    }
    Some(order * (order + 1) / 2 + j)
}

/// Offset of `(a, b, j, k)` in a flat tensor buffer.
pub(crate) fn flat_index(a: usize, b: usize, j: usize, k: usize) -> Option<usize> {
    if a >= Coordinate::COUNT || b >= Coordinate::COUNT {
        return None;
    }
    exponent_slot(j, k).map(|slot| (a * Coordinate::COUNT + b) * EXPONENT_PAIRS + slot)
}

/// Per-particle powers `(c - o)^0 ..= (c - o)^MAX_ORDER` for every coordinate.
pub type PowerTable = [[f64; MAX_ORDER + 1]; Coordinate::COUNT];

/// Builds the power table for one centered coordinate vector.
pub fn power_table(centered: &[f64; Coordinate::COUNT]) -> PowerTable {
    let mut table = [[1.0; MAX_ORDER + 1]; Coordinate::COUNT];
    for (row, &value) in table.iter_mut().zip(centered.iter()) {
        for exp in 1..=MAX_ORDER {
            row[exp] = row[exp - 1] * value;
        }
    }
    table
}

/// Running sums of products of centered coordinate powers.
///
/// Indexed by an ordered coordinate pair `(a, b)` and exponents `(j, k)`; only
/// exponent pairs up to total order four are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSums {
    values: Vec<f64>,
}

impl Default for PowerSums {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl PowerSums {
    /// Total number of stored sums.
    pub const LEN: usize = PAIRS * EXPONENT_PAIRS;

    /// Creates a tensor with every sum at zero.
    pub fn zeroed() -> Self {
        Self {
            values: vec![0.0; Self::LEN],
        }
    }

    /// Returns the sum for `(a, b, j, k)`, or `None` for a pruned exponent pair.
    pub fn get(&self, a: Coordinate, b: Coordinate, j: usize, k: usize) -> Option<f64> {
        flat_index(a.index(), b.index(), j, k).map(|idx| self.values[idx])
    }

    /// Adds one particle's contribution for every stored `(a, b, j, k)`.
    pub fn add(&mut self, powers: &PowerTable) {
        for a in 0..Coordinate::COUNT {
            for b in 0..Coordinate::COUNT {
                let base = (a * Coordinate::COUNT + b) * EXPONENT_PAIRS;
                let block = &mut self.values[base..base + EXPONENT_PAIRS];
                for order in 0..=MAX_ORDER {
                    for j in 0..=order {
                        let k = order - j;
                        block[order * (order + 1) / 2 + j] += powers[a][j] * powers[b][k];
                    }
                }
            }
        }
    }

    /// Adds another tensor element-wise.
    pub fn merge(&mut self, other: &PowerSums) {
        for (value, extra) in self.values.iter_mut().zip(other.values.iter()) {
            *value += extra;
        }
    }

    /// Zeroes every sum without reallocating.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|value| *value = 0.0);
    }

    /// Raw flat storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_dense_and_unique() {
        let mut seen = [false; EXPONENT_PAIRS];
        for j in 0..=MAX_ORDER {
            for k in 0..=(MAX_ORDER - j) {
                let slot = exponent_slot(j, k).unwrap();
                assert!(!seen[slot]);
                seen[slot] = true;
            }
        }
        assert!(seen.iter().all(|flag| *flag));
        assert_eq!(exponent_slot(4, 1), None);
        assert_eq!(exponent_slot(2, 2), Some(12));
    }

    #[test]
    fn single_particle_sums_match_products() {
        let mut sums = PowerSums::zeroed();
        let centered = [2.0, -1.0, 0.5, 0.0, 3.0, 1.5];
        sums.add(&power_table(&centered));
        let value = sums.get(Coordinate::X, Coordinate::P, 3, 1).unwrap();
        assert_eq!(value, 8.0 * 3.0);
        let value = sums.get(Coordinate::Xp, Coordinate::Xp, 2, 2).unwrap();
        assert_eq!(value, 1.0);
        assert_eq!(sums.get(Coordinate::T, Coordinate::T, 0, 0), Some(1.0));
        assert_eq!(sums.get(Coordinate::X, Coordinate::X, 4, 4), None);
    }
}
