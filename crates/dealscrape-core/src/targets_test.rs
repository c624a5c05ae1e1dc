use std::path::Path;

use super::*;

const GROUPON_UK: &str = r#"
targets:
  - site: Groupon
    locale: en_GB
    category: Getaways
    parser: groupon
    patterns:
      - 'http://www.groupon.co.uk/deals/groupon-getaways/[\w-]+/(\d+)'
  - site: Groupon
    locale: en_GB
    parser: groupon
    patterns:
      - 'http://api.groupon.de/feed/api/v1/deals/oftheday/UK'
      - 'http://www.groupon.co.uk/deals/([\w-]+)/[\w-]+/(\d+)'
    locations:
      national-deal:
        location: National
        category: Goods
      bordeaux-extra:
        location: Bordeaux Metropole
"#;

#[test]
fn parse_targets_preserves_file_order() {
    let file = parse_targets(GROUPON_UK).unwrap();
    assert_eq!(file.targets.len(), 2);
    assert_eq!(file.targets[0].category, "Getaways");
    assert_eq!(file.targets[1].category, "");
}

#[test]
fn parse_targets_preserves_pattern_order() {
    let file = parse_targets(GROUPON_UK).unwrap();
    let patterns = &file.targets[1].patterns;
    assert_eq!(patterns.len(), 2);
    assert!(patterns[0].contains("feed"));
    assert!(patterns[1].contains("deals"));
}

#[test]
fn parse_targets_reads_location_overrides() {
    let file = parse_targets(GROUPON_UK).unwrap();
    let national = &file.targets[1].locations["national-deal"];
    assert_eq!(national.location, "National");
    assert_eq!(national.category, "Goods");
}

#[test]
fn location_override_category_defaults_to_empty() {
    let file = parse_targets(GROUPON_UK).unwrap();
    let bordeaux = &file.targets[1].locations["bordeaux-extra"];
    assert_eq!(bordeaux.location, "Bordeaux Metropole");
    assert!(bordeaux.category.is_empty());
}

#[test]
fn targets_without_patterns_or_locations_get_their_own_empty_containers() {
    let yaml = r"
targets:
  - site: Disabled
    locale: fr_FR
    parser: groupon
  - site: AlsoDisabled
    locale: de_DE
    parser: groupon
";
    let mut file = parse_targets(yaml).unwrap();
    assert!(file.targets[0].patterns.is_empty());
    file.targets[0].patterns.push("x".to_string());
    assert!(file.targets[1].patterns.is_empty());
}

#[test]
fn label_matches_site_locale_category() {
    let file = parse_targets(GROUPON_UK).unwrap();
    assert_eq!(file.targets[0].label(), "Groupon [en_GB] Getaways");
}

#[test]
fn validate_rejects_empty_site() {
    let yaml = r"
targets:
  - site: '  '
    locale: en_GB
    parser: groupon
";
    let result = parse_targets(yaml);
    assert!(
        matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("site")),
        "expected site validation error, got: {result:?}"
    );
}

#[test]
fn validate_rejects_empty_parser() {
    let yaml = r"
targets:
  - site: Groupon
    locale: en_GB
    parser: ''
";
    let result = parse_targets(yaml);
    assert!(
        matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("parser")),
        "expected parser validation error, got: {result:?}"
    );
}

#[test]
fn validate_rejects_malformed_locale() {
    for locale in ["en-GB", "EN_gb", "english", "en_GBR"] {
        let yaml = format!(
            "targets:\n  - site: Groupon\n    locale: {locale}\n    parser: groupon\n"
        );
        let result = parse_targets(&yaml);
        assert!(
            matches!(result, Err(ConfigError::Validation(_))),
            "locale {locale} should be rejected, got: {result:?}"
        );
    }
}

#[test]
fn validate_rejects_blank_pattern() {
    let yaml = r"
targets:
  - site: Groupon
    locale: en_GB
    parser: groupon
    patterns:
      - ''
";
    assert!(matches!(
        parse_targets(yaml),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn parse_targets_rejects_invalid_yaml() {
    let result = parse_targets("targets: [unclosed");
    assert!(matches!(result, Err(ConfigError::TargetsFileParse(_))));
}

#[test]
fn load_targets_reports_missing_file() {
    let result = load_targets(Path::new("/nonexistent/dealscrape/targets.yaml"));
    assert!(
        matches!(result, Err(ConfigError::TargetsFileIo { ref path, .. }) if path.contains("nonexistent")),
        "expected TargetsFileIo, got: {result:?}"
    );
}

#[test]
fn shipped_targets_file_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/targets.yaml");
    let file = load_targets(&path).unwrap();
    assert!(!file.targets.is_empty());
    assert!(file.targets.iter().all(|t| t.parser == "groupon"));
}
