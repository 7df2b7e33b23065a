use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_default_enables_everything() {
    let config = PerfConfig::default();
    assert!(config.method_cache());
    assert!(config.field_cache());
    assert!(config.index_cache());
    assert!(config.scope_pool());
    assert!(config.adaptive_growth());
    assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
}

#[test]
fn test_parse_named_options() {
    let config = PerfConfig::parse("methodCache=off, scopePool=false indexCache=0").unwrap();
    assert!(!config.method_cache());
    assert!(!config.scope_pool());
    assert!(!config.index_cache());
    assert!(config.field_cache());
    assert!(config.adaptive_growth());
}

#[test]
fn test_parse_call_depth() {
    let config: PerfConfig = "maxCallDepth=64".parse().unwrap();
    assert_eq!(config.max_call_depth, 64);
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        PerfConfig::parse("turbo=on"),
        Err(ConfigError::UnknownOption("turbo".into()))
    );
    assert_eq!(
        PerfConfig::parse("fieldCache=maybe"),
        Err(ConfigError::InvalidValue {
            option: "fieldCache".into(),
            value: "maybe".into()
        })
    );
    assert_eq!(
        PerfConfig::parse("fieldCache").unwrap_err().to_string(),
        "expected name=value, found 'fieldCache'"
    );
}

#[test]
fn test_display_roundtrips_through_parse() {
    let config = PerfConfig::baseline().with(PerfFlags::FIELD_CACHE, true);
    let reparsed = PerfConfig::parse(&config.to_string()).unwrap();
    assert_eq!(reparsed, config);
}

#[test]
fn test_all_subsets_are_distinct() {
    let subsets: Vec<PerfFlags> = (0u8..32).map(PerfFlags::from_bits_truncate).collect();
    assert_eq!(subsets.len(), 32);
    assert_eq!(subsets[31], PerfFlags::all());
}
