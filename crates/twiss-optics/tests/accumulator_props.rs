use proptest::prelude::*;
use twiss_core::{Coordinate, ParticleRecord};
use twiss_optics::{CentralMoments, MomentAccumulator};

const MASS: f64 = 0.938;

fn record() -> impl Strategy<Value = ParticleRecord> {
    (
        -1.0f64..1.0,
        -1.0f64..1.0,
        -1.0f64..1.0,
        -1.0f64..1.0,
        2.0f64..3.0,
        -5.0f64..5.0,
    )
        .prop_map(|(x, xp, y, yp, energy, t)| {
            ParticleRecord::primary(x, xp, y, yp, energy, t, 0.0)
        })
}

const EXPONENTS: [(usize, usize); 10] = [
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

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

fn assert_moments_close(left: &CentralMoments, right: &CentralMoments) {
    assert_eq!(left.count(), right.count());
    for a in Coordinate::ALL {
        for b in Coordinate::ALL {
            for (j, k) in EXPONENTS {
                let (l, r) = (left.get(a, b, j, k), right.get(a, b, j, k));
                assert!(close(l, r), "({a:?},{b:?},{j},{k}): {l} vs {r}");
            }
        }
    }
}

proptest! {
    #[test]
    fn moments_ignore_order_after_first_particle(
        records in prop::collection::vec(record(), 3..40),
        shift in 0usize..40,
    ) {
        let mut forward = MomentAccumulator::new(MASS);
        forward.fill(&records);

        let mut shuffled = records.clone();
        let len = shuffled.len() - 1;
        shuffled[1..].rotate_left(shift % len);
        shuffled[1..].reverse();
        let mut permuted = MomentAccumulator::new(MASS);
        permuted.fill(&shuffled);

        assert_moments_close(&forward.central_moments(), &permuted.central_moments());
    }

    #[test]
    fn merged_partials_equal_single_pass(
        records in prop::collection::vec(record(), 2..40),
        split in 1usize..40,
    ) {
        let split = split.min(records.len() - 1);
        let mut whole = MomentAccumulator::new(MASS);
        whole.fill(&records);
        let offsets = *whole.offsets().expect("offsets captured");

        let mut left = MomentAccumulator::with_offsets(MASS, offsets);
        left.fill(&records[..split]);
        let mut right = MomentAccumulator::with_offsets(MASS, offsets);
        right.fill(&records[split..]);
        left.merge(&right).expect("compatible partials");

        prop_assert_eq!(left.count(), whole.count());
        for (l, w) in left.power_sums().as_slice().iter().zip(whole.power_sums().as_slice()) {
            prop_assert!(close(*l, *w));
        }
        assert_moments_close(&left.central_moments(), &whole.central_moments());
    }
}

#[test]
fn merge_rejects_mismatched_offsets() {
    let mut left = MomentAccumulator::new(MASS);
    left.fill(&[ParticleRecord::primary(0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0)]);
    let mut right = MomentAccumulator::new(MASS);
    right.fill(&[ParticleRecord::primary(1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0)]);
    let err = left.merge(&right).expect_err("offsets differ");
    assert_eq!(err.info().code, "offset-mismatch");
}

#[test]
fn merge_rejects_other_species() {
    let mut left = MomentAccumulator::new(MASS);
    let right = MomentAccumulator::new(0.000_511);
    let err = left.merge(&right).expect_err("masses differ");
    assert_eq!(err.info().code, "rest-mass-mismatch");
}

#[test]
fn reset_clears_state() {
    let mut acc = MomentAccumulator::new(MASS);
    acc.fill(&[ParticleRecord::primary(1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 3.0)]);
    acc.reset();
    assert_eq!(acc.count(), 0);
    assert_eq!(acc.passes(), 0);
    assert!(acc.offsets().is_none());
    assert_eq!(acc.reference_s(), 0.0);
    assert!(acc.power_sums().as_slice().iter().all(|v| *v == 0.0));
}
