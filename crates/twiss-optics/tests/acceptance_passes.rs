use twiss_core::{Coordinate, ParticleRecord};
use twiss_optics::MomentAccumulator;

const MASS: f64 = 0.938;

fn at(x: f64, s: f64) -> ParticleRecord {
    ParticleRecord::primary(x, 0.0, 0.0, 0.0, 2.0, 0.0, s)
}

#[test]
fn secondaries_later_turns_and_backward_particles_are_skipped() {
    let mut acc = MomentAccumulator::new(MASS);
    let secondary = ParticleRecord {
        parent_id: 4,
        ..at(100.0, 1.0)
    };
    let second_turn = ParticleRecord {
        turn: 2,
        ..at(100.0, 1.0)
    };
    let backward = ParticleRecord {
        zp: -0.5,
        ..at(100.0, 1.0)
    };
    let transverse = ParticleRecord {
        zp: 0.0,
        ..at(100.0, 1.0)
    };
    let turn_zero = ParticleRecord {
        turn: 0,
        ..at(3.0, 7.0)
    };
    let accepted = acc.fill(&[secondary, second_turn, backward, transverse, turn_zero, at(5.0, 8.0)]);

    assert_eq!(accepted, 2);
    assert_eq!(acc.count(), 2);
    assert_eq!(acc.reference_s(), 7.0);
    assert_eq!(acc.central_moments().mean(Coordinate::X), 4.0);
    assert_eq!(acc.offsets().map(|o| o[Coordinate::X]), Some(3.0));
}

#[test]
fn rejected_records_leave_the_accumulator_untouched() {
    let mut acc = MomentAccumulator::new(MASS);
    let rejected = ParticleRecord {
        parent_id: 1,
        ..at(1.0, 2.0)
    };
    assert!(!acc.push(&rejected));
    assert_eq!(acc.count(), 0);
    assert!(acc.offsets().is_none());
    assert!(acc.power_sums().as_slice().iter().all(|v| *v == 0.0));
}

#[test]
fn reference_s_follows_first_accepted_particle_of_latest_pass() {
    let mut acc = MomentAccumulator::new(MASS);
    acc.fill(&[at(1.0, 10.0), at(2.0, 11.0)]);
    assert_eq!(acc.reference_s(), 10.0);

    acc.fill(&[
        ParticleRecord {
            parent_id: 2,
            ..at(9.0, 99.0)
        },
        at(3.0, 20.0),
        at(4.0, 21.0),
    ]);
    assert_eq!(acc.passes(), 2);
    assert_eq!(acc.count(), 4);
    assert_eq!(acc.reference_s(), 20.0);
    assert_eq!(acc.offsets().map(|o| o[Coordinate::X]), Some(1.0));
    assert_eq!(acc.central_moments().mean(Coordinate::X), 2.5);
}

#[test]
fn empty_pass_keeps_previous_reference() {
    let mut acc = MomentAccumulator::new(MASS);
    acc.fill(&[at(1.0, 10.0)]);
    let accepted = acc.fill(&[]);
    assert_eq!(accepted, 0);
    assert_eq!(acc.reference_s(), 10.0);
    assert_eq!(acc.passes(), 2);
}

#[test]
fn momentum_is_derived_from_energy_and_mass() {
    let mut acc = MomentAccumulator::new(3.0);
    acc.fill(&[ParticleRecord::primary(0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0)]);
    assert_eq!(acc.central_moments().mean(Coordinate::P), 4.0);
}
