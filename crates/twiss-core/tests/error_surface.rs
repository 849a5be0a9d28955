use twiss_core::errors::{ErrorInfo, TwissError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("sampler", "d1")
        .with_context("reason", "example")
}

#[test]
fn input_error_surface() {
    let err = TwissError::Input(sample_info("I001", "empty stream"));
    assert_eq!(err.info().code, "I001");
    assert!(err.info().context.contains_key("sampler"));
}

#[test]
fn species_error_surface() {
    let err = TwissError::Species(sample_info("P001", "unknown species"));
    assert_eq!(err.info().code, "P001");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn sampler_error_surface() {
    let err = TwissError::Sampler(sample_info("S001", "no such sampler"));
    assert_eq!(err.info().code, "S001");
}

#[test]
fn config_error_surface() {
    let err = TwissError::Config(sample_info("C001", "bad yaml"));
    assert_eq!(err.info().code, "C001");
}

#[test]
fn display_includes_context_and_hint() {
    let err = TwissError::Sampler(
        ErrorInfo::new("unknown-sampler", "sampler not found")
            .with_context("sampler", "q1")
            .with_hint("check the sampler list"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("sampler error: sampler not found (code: unknown-sampler)"));
    assert!(rendered.contains("sampler=q1"));
    assert!(rendered.ends_with("hint: check the sampler list"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = TwissError::Serde(sample_info("J001", "schema mismatch"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Serde\""));
    let restored: TwissError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, err);
}

#[test]
fn family_constructors_pick_the_variant() {
    assert!(matches!(TwissError::input("I002", "m"), TwissError::Input(_)));
    assert!(matches!(TwissError::species("P002", "m"), TwissError::Species(_)));
    assert!(matches!(TwissError::sampler("S002", "m"), TwissError::Sampler(_)));
    assert!(matches!(TwissError::config("C002", "m"), TwissError::Config(_)));
    assert!(matches!(TwissError::rng("R002", "m"), TwissError::Rng(_)));
    assert!(matches!(TwissError::serde("J002", "m"), TwissError::Serde(_)));

    let err = TwissError::input("pass-out-of-range", "pass label too large")
        .with_context("row", "3")
        .with_hint("number passes from zero");
    assert_eq!(err, TwissError::Input(
        ErrorInfo::new("pass-out-of-range", "pass label too large")
            .with_context("row", "3")
            .with_hint("number passes from zero"),
    ));
}
