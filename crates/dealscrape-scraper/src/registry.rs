//! Compiled, read-only target definitions.

use std::collections::BTreeMap;

use dealscrape_core::{LocationOverride, TargetConfig};
use regex::Regex;

use crate::error::ScraperError;

/// A target with its URL patterns compiled, in declaration order.
#[derive(Debug, Clone)]
pub struct Target {
    site: String,
    locale: String,
    category: String,
    parser_id: String,
    patterns: Vec<Regex>,
    location_map: BTreeMap<String, LocationOverride>,
}

impl Target {
    /// Compiles every pattern of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidPattern`] for the first pattern that is
    /// not a valid regular expression.
    pub fn compile(config: &TargetConfig) -> Result<Self, ScraperError> {
        let patterns = config
            .patterns
            .iter()
            .map(|source| {
                Regex::new(source).map_err(|e| ScraperError::InvalidPattern {
                    site: config.label(),
                    pattern: source.clone(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            site: config.site.clone(),
            locale: config.locale.clone(),
            category: config.category.clone(),
            parser_id: config.parser.clone(),
            patterns,
            location_map: config.locations.clone(),
        })
    }

    #[must_use]
    pub fn site(&self) -> &str {
        &self.site
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Static category; empty when the category comes from the location map.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn parser_id(&self) -> &str {
        &self.parser_id
    }

    /// Patterns, most specific first.
    #[must_use]
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    #[must_use]
    pub fn location_map(&self) -> &BTreeMap<String, LocationOverride> {
        &self.location_map
    }

    /// A target without patterns never matches.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.patterns.is_empty()
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{} [{}] {}", self.site, self.locale, self.category)
    }
}

/// Ordered collection of targets, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    #[must_use]
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Compiles `configs` in order.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidPattern`] if any pattern fails to compile.
    pub fn from_configs(configs: &[TargetConfig]) -> Result<Self, ScraperError> {
        let targets = configs
            .iter()
            .map(Target::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(targets))
    }

    /// All targets in registry order.
    #[must_use]
    pub fn all(&self) -> &[Target] {
        &self.targets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
