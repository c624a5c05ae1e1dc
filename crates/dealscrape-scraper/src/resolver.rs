//! URL → target resolution.
//!
//! Targets are tried in registry order and, within a target, patterns in
//! declaration order; the first pattern that matches anywhere in the URL
//! (search, not full match) wins. Query strings never take part in matching.

use std::collections::BTreeMap;
use std::sync::Arc;

use dealscrape_core::LocationOverride;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::ScraperError;
use crate::model::UrlInfo;
use crate::registry::{Target, TargetRegistry};
use crate::text::{location_display, strip_query_string};

/// Everything known about a URL after it matched a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedContext {
    pub site: String,
    pub locale: String,
    pub category: String,
    pub parser_id: String,
    /// Capture groups of the matching pattern in order; groups that did not
    /// participate in the match are empty strings.
    pub captures: Vec<String>,
    pub location: String,
    /// Trailing identifier (second capture group), passed through untouched.
    pub rel_id: Option<String>,
    /// Source of the pattern that matched.
    pub pattern: String,
    pub location_map: BTreeMap<String, LocationOverride>,
}

impl ResolvedContext {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} [{}] {}", self.site, self.locale, self.category)
    }

    /// Overlays the fields a content model chose to set.
    pub fn apply(&mut self, info: UrlInfo) {
        if let Some(location) = info.location {
            self.location = location;
        }
        if let Some(category) = info.category {
            self.category = category;
        }
        if let Some(rel_id) = info.rel_id {
            self.rel_id = Some(rel_id);
        }
    }
}

/// Matches URLs against a shared, read-only [`TargetRegistry`].
#[derive(Debug, Clone)]
pub struct TargetResolver {
    registry: Arc<TargetRegistry>,
}

impl TargetResolver {
    #[must_use]
    pub fn new(registry: TargetRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Resolves `url` to the first matching target.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::NoTargetMatch`] when no pattern of any target
    /// matches the URL with its query string removed.
    pub fn resolve(&self, url: &str) -> Result<ResolvedContext, ScraperError> {
        let stripped = strip_query_string(url);

        self.registry
            .all()
            .iter()
            .find_map(|target| {
                target.patterns().iter().find_map(|pattern| {
                    pattern
                        .captures(stripped)
                        .map(|caps| build_context(target, pattern, &caps))
                })
            })
            .ok_or_else(|| ScraperError::NoTargetMatch {
                url: url.to_owned(),
            })
    }
}

fn build_context(target: &Target, pattern: &Regex, caps: &Captures<'_>) -> ResolvedContext {
    let captures: Vec<String> = caps
        .iter()
        .skip(1)
        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
        .collect();

    let code = captures.first().map_or("", String::as_str);
    let rel_id = captures.get(1).cloned();

    // The branch depends only on the target's static category, never on the
    // capture. Map keys are raw codes; only display values are normalized.
    let (location, category) = if !target.category().is_empty() {
        (location_display(code), target.category().to_owned())
    } else if let Some(entry) = target.location_map().get(code) {
        (entry.location.clone(), entry.category.clone())
    } else {
        (location_display(code), String::new())
    };

    ResolvedContext {
        site: target.site().to_owned(),
        locale: target.locale().to_owned(),
        category,
        parser_id: target.parser_id().to_owned(),
        captures,
        location,
        rel_id,
        pattern: pattern.as_str().to_owned(),
        location_map: target.location_map().clone(),
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
