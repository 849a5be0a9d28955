use twiss_core::{Coordinate, CoordinateVector, ParticleRecord, Plane, ReferenceEmittance};

#[test]
fn acceptance_requires_primary_first_turn_forward() {
    let base = ParticleRecord::primary(0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    assert!(base.is_accepted());

    let secondary = ParticleRecord {
        parent_id: 3,
        ..base
    };
    assert!(!secondary.is_accepted());

    let second_turn = ParticleRecord { turn: 2, ..base };
    assert!(!second_turn.is_accepted());

    let zeroth_turn = ParticleRecord { turn: 0, ..base };
    assert!(zeroth_turn.is_accepted());

    let backward = ParticleRecord { zp: -0.5, ..base };
    assert!(!backward.is_accepted());

    let grazing = ParticleRecord { zp: 0.0, ..base };
    assert!(!grazing.is_accepted());
}

#[test]
fn coordinate_vector_derives_momentum() {
    let record = ParticleRecord::primary(1e-3, 2e-3, 3e-3, 4e-3, 5.0, 7.0, 12.0);
    let coords = CoordinateVector::from_record(&record, 3.0);
    assert_eq!(coords[Coordinate::X], 1e-3);
    assert_eq!(coords[Coordinate::Yp], 4e-3);
    assert_eq!(coords[Coordinate::P], 4.0);
    assert_eq!(coords[Coordinate::T], 7.0);
}

#[test]
fn planes_map_onto_adjacent_pairs() {
    for plane in Plane::ALL {
        assert_eq!(plane.angle().index(), plane.position().index() + 1);
    }
    assert!(Plane::Horizontal.is_transverse());
    assert!(!Plane::Longitudinal.is_transverse());
}

#[test]
fn reference_emittance_is_zero_longitudinally() {
    let reference = ReferenceEmittance {
        emittance_x: 1.0,
        emittance_y: 2.0,
        error_emittance_x: 0.1,
        error_emittance_y: 0.2,
    };
    assert_eq!(reference.emittance(Plane::Vertical), 2.0);
    assert_eq!(reference.error(Plane::Horizontal), 0.1);
    assert_eq!(reference.emittance(Plane::Longitudinal), 0.0);
    assert!(!reference.is_zero());
    assert!(ReferenceEmittance::default().is_zero());
    let error_only = ReferenceEmittance {
        error_emittance_y: 1e-9,
        ..ReferenceEmittance::default()
    };
    assert!(!error_only.is_zero());
}

#[test]
fn record_defaults_fill_optional_columns() {
    let json = r#"{"zp":1.0,"x":0.0,"xp":0.0,"y":0.0,"yp":0.0,"energy":2.0,"t":0.0}"#;
    let record: ParticleRecord = serde_json::from_str(json).expect("decode");
    assert_eq!(record.parent_id, 0);
    assert_eq!(record.turn, 1);
    assert_eq!(record.s, 0.0);
}
