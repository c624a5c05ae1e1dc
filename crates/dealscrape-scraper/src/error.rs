use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("no target pattern matches {url}")]
    NoTargetMatch { url: String },

    #[error("transport failure for {url}: {reason}")]
    TransportFailure { url: String, reason: String },

    #[error("markup from {url} could not be parsed: {reason}")]
    MarkupUnparseable { url: String, reason: String },

    /// A content model expected an element that the page does not have.
    /// `locator` is the selector or path that came back empty.
    #[error("{url}: missing {field} at {locator}")]
    RequiredElementMissing {
        url: String,
        field: String,
        locator: String,
    },

    #[error("invalid pattern for target {site}: {pattern}: {source}")]
    InvalidPattern {
        site: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScraperError {
    pub(crate) fn missing(url: &str, field: &str, locator: &str) -> Self {
        ScraperError::RequiredElementMissing {
            url: url.to_owned(),
            field: field.to_owned(),
            locator: locator.to_owned(),
        }
    }
}
