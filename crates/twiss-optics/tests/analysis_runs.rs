use twiss_core::{ParticleRecord, Plane, ReferenceEmittance, TwissError};
use twiss_optics::{
    analyse, generate, AnalysisConfig, BeamSpec, ParticleTable, PlaneStatus, PlaneTwiss,
    SpeciesId,
};

fn beam(seed: u64, particles: usize, s: f64) -> Vec<ParticleRecord> {
    let spec = BeamSpec {
        particles,
        seed,
        horizontal: PlaneTwiss {
            emittance: 1e-6,
            alpha: 0.4,
            beta: 12.0,
            ..PlaneTwiss::default()
        },
        relative_momentum_spread: 1e-3,
        time_spread: 0.05,
        s,
        ..BeamSpec::default()
    };
    generate(&spec, 0.938_272_088_16).expect("beam")
}

fn proton() -> AnalysisConfig {
    AnalysisConfig::new(SpeciesId::Name("proton".to_string()))
}

fn three_sampler_table() -> ParticleTable {
    let mut table = ParticleTable::new();
    for pass in 0..2 {
        table.extend(pass, "d1", beam(10 + pass as u64, 500, 1.0)).expect("d1");
        table.extend(pass, "q1", beam(20 + pass as u64, 400, 2.5)).expect("q1");
        table.extend(pass, "m1", beam(30 + pass as u64, 300, 4.0)).expect("m1");
    }
    table
}

#[test]
fn report_order_and_hash_do_not_depend_on_concurrency() {
    let table = three_sampler_table();
    let serial = analyse(&table, &proton()).expect("serial run");
    let parallel = analyse(
        &table,
        &AnalysisConfig {
            concurrency: 3,
            ..proton()
        },
    )
    .expect("parallel run");

    let names: Vec<_> = serial.samplers.iter().map(|s| s.sampler.as_str()).collect();
    assert_eq!(names, ["d1", "q1", "m1"]);
    assert_eq!(serial.samplers, parallel.samplers);
    assert_eq!(serial.report_hash, parallel.report_hash);
    assert_eq!(serial.report_hash, serial.compute_hash().expect("hash"));
    assert_eq!(serial.provenance.passes, 2);
    assert_eq!(serial.provenance.species, "proton");
    assert!(serial.provenance.tool_versions.contains_key("twiss-optics"));
}

#[test]
fn every_pass_contributes_to_each_sampler() {
    let table = three_sampler_table();
    let report = analyse(&table, &proton()).expect("run");
    let quad = report.sampler("q1").expect("q1 present");
    let horizontal = quad.plane(Plane::Horizontal).expect("horizontal");
    assert_eq!(horizontal.values.particles, 800.0);
    assert_eq!(horizontal.values.s, 2.5);
    assert_eq!(horizontal.status, PlaneStatus::Ok);
    assert!(quad.is_ok());
}

#[test]
fn sampler_selection_keeps_requested_order() {
    let table = three_sampler_table();
    let config = AnalysisConfig {
        samplers: vec!["m1".to_string(), "d1".to_string()],
        ..proton()
    };
    let report = analyse(&table, &config).expect("run");
    let names: Vec<_> = report.samplers.iter().map(|s| s.sampler.as_str()).collect();
    assert_eq!(names, ["m1", "d1"]);
}

#[test]
fn unknown_sampler_is_rejected() {
    let table = three_sampler_table();
    let config = AnalysisConfig {
        samplers: vec!["nope".to_string()],
        ..proton()
    };
    match analyse(&table, &config) {
        Err(TwissError::Sampler(info)) => {
            assert_eq!(info.code, "unknown-sampler");
            assert_eq!(info.context.get("sampler").map(String::as_str), Some("nope"));
        }
        other => panic!("expected sampler error, got {other:?}"),
    }
}

#[test]
fn empty_source_is_rejected() {
    let err = analyse(&ParticleTable::new(), &proton()).expect_err("empty");
    assert!(matches!(err, TwissError::Input(_)));
    assert_eq!(err.info().code, "empty-source");
}

#[test]
fn unknown_species_is_rejected_before_accumulation() {
    let config = AnalysisConfig {
        species: SpeciesId::Name("unobtainium".to_string()),
        ..proton()
    };
    let err = analyse(&three_sampler_table(), &config).expect_err("unknown species");
    assert!(matches!(err, TwissError::Species(_)));
}

#[test]
fn sampler_without_accepted_particles_is_flagged() {
    let mut table = three_sampler_table();
    table.push(
        0,
        "dump",
        ParticleRecord {
            zp: -1.0,
            ..ParticleRecord::primary(0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0)
        },
    )
    .expect("push");
    let report = analyse(&table, &proton()).expect("run");
    let dump = report.sampler("dump").expect("dump present");
    for optics in &dump.planes {
        assert_eq!(optics.status, PlaneStatus::InsufficientStatistics);
        assert_eq!(optics.values.particles, 0.0);
    }
    assert!(!dump.is_ok());
}

#[test]
fn reference_override_is_recorded_in_provenance() {
    let config = AnalysisConfig {
        reference_emittance: Some(ReferenceEmittance {
            emittance_x: 2e-6,
            emittance_y: 3e-6,
            error_emittance_x: 1e-8,
            error_emittance_y: 2e-8,
        }),
        use_reference_emittance: true,
        species: SpeciesId::Pdg(2212),
        ..proton()
    };
    let report = analyse(&three_sampler_table(), &config).expect("run");
    assert!(report.provenance.reference_emittance_used);
    let vertical = report.samplers[0].plane(Plane::Vertical).expect("vertical");
    assert_eq!(vertical.values.emittance, 3e-6);
    assert_eq!(vertical.errors.emittance, 2e-8);
}
