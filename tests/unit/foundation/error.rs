use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RopelineError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(RopelineError::asset("x").to_string().contains("asset error:"));
    assert!(
        RopelineError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RopelineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_become_serde_variant() {
    let err: RopelineError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, RopelineError::Serde(_)));
}
