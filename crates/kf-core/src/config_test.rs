use super::*;

#[test]
fn test_defaults() {
    let config = SynthesisConfig::default();
    assert!(config.enabled);
    assert!(!config.quote_identifiers);
}

#[test]
fn test_deserialize_partial() {
    let config: SynthesisConfig = serde_yaml::from_str("quote_identifiers: true\n").unwrap();
    assert!(config.enabled);
    assert!(config.quote_identifiers);
}

#[test]
fn test_deserialize_disabled() {
    let config: SynthesisConfig = serde_yaml::from_str("enabled: false\n").unwrap();
    assert!(!config.enabled);
}
