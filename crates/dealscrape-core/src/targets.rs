use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Canonical display values for a location code embedded in target URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationOverride {
    pub location: String,
    #[serde(default)]
    pub category: String,
}

/// One static target definition as written in the targets file.
///
/// Patterns are regular-expression sources, most specific first. A target
/// with no patterns is legal and never matches, which is how sites get
/// switched off without deleting their entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub site: String,
    pub locale: String,
    /// Empty means the category is derived per match from `locations`.
    #[serde(default)]
    pub category: String,
    /// Identifier of the content model that parses this target's pages.
    pub parser: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Keyed by the raw first capture group of the matching pattern.
    #[serde(default)]
    pub locations: BTreeMap<String, LocationOverride>,
}

impl TargetConfig {
    /// Human-readable label, e.g. `"Groupon [en_GB] Getaways"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} [{}] {}", self.site, self.locale, self.category)
    }
}

#[derive(Debug, Deserialize)]
pub struct TargetsFile {
    pub targets: Vec<TargetConfig>,
}

/// Load and validate the target definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TargetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_targets(&content)
}

/// Parse and validate target definitions from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML or fails validation.
pub fn parse_targets(yaml: &str) -> Result<TargetsFile, ConfigError> {
    let targets_file: TargetsFile =
        serde_yaml::from_str(yaml).map_err(ConfigError::TargetsFileParse)?;

    validate_targets(&targets_file)?;

    Ok(targets_file)
}

fn validate_targets(targets_file: &TargetsFile) -> Result<(), ConfigError> {
    for (idx, target) in targets_file.targets.iter().enumerate() {
        if target.site.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "target #{idx} has an empty site name"
            )));
        }

        if target.parser.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty parser id",
                target.label()
            )));
        }

        if !is_locale_code(&target.locale) {
            return Err(ConfigError::Validation(format!(
                "target '{}' has invalid locale '{}'; expected a code like en_GB",
                target.site, target.locale
            )));
        }

        if target.patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty pattern",
                target.label()
            )));
        }
    }

    Ok(())
}

/// `ll_RR`: two lowercase ASCII letters, an underscore, two uppercase ASCII letters.
fn is_locale_code(locale: &str) -> bool {
    let bytes = locale.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_lowercase()
        && bytes[2] == b'_'
        && bytes[3].is_ascii_uppercase()
        && bytes[4].is_ascii_uppercase()
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;
