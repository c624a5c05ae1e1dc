//! One GET, one parse, one [`FetchOutcome`].
//!
//! [`FetchPipeline::fetch`] is total: DNS errors, refused connections,
//! timeouts, non-200 statuses and unparseable bodies all come back as a
//! failed outcome, never as an `Err`. There are no retries here.

mod document;
mod xml;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Proxy, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ScraperError;

pub use document::{parse_markup, ContentType, Document, MarkupError};
pub use xml::{XmlElement, XmlNode};

/// Applied when the caller does not pick a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status reported when no HTTP status was received.
pub const STATUS_NOT_ATTEMPTED: u16 = 500;

/// Status reported when the host could not be reached at all.
pub const STATUS_UNREACHABLE: u16 = 404;

/// Browser strings sent as `User-Agent`, one picked per request.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Linux i686)",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:14.0) Gecko/20100101 Firefox/14.0.1",
    "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Win64; x64; Trident/5.0)",
    "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.1 (KHTML, like Gecko) Chrome/21.0.1180.60 Safari/537.1",
];

/// Picks a `User-Agent` uniformly from [`USER_AGENTS`].
#[must_use]
pub fn pick_user_agent<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    USER_AGENTS[rng.random_range(0..USER_AGENTS.len())]
}

/// A request header supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderParseError {
    #[error("expected `name: value`, got {0:?}")]
    MissingSeparator(String),

    #[error("invalid header name {0:?}")]
    InvalidName(String),

    #[error("invalid value for header {0:?}")]
    InvalidValue(String),
}

impl FromStr for Header {
    type Err = HeaderParseError;

    /// Parses `Name: value`. Whitespace around both parts is trimmed.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| HeaderParseError::MissingSeparator(raw.to_owned()))?;
        let name = name.trim();
        let value = value.trim();
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HeaderParseError::InvalidName(name.to_owned()))?;
        HeaderValue::from_str(value).map_err(|_| HeaderParseError::InvalidValue(name.to_owned()))?;
        Ok(Self::new(name, value))
    }
}

/// Per-request knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Sent in order. A caller-supplied `User-Agent` is replaced.
    pub headers: Vec<Header>,
    /// `host:port`, used for plain-HTTP URLs.
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Why a [`FetchOutcome`] has no root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// DNS, connect, timeout, or a broken response body.
    Transport,
    /// The server answered with something other than 200.
    Status,
    /// The body parsed as neither XML nor HTML.
    MarkupUnparseable,
}

/// Result of one fetch-and-parse attempt.
///
/// `root` is present only when `status == 200`; with no root, callers must
/// not attempt extraction.
#[derive(Debug)]
pub struct FetchOutcome {
    pub content_type: ContentType,
    pub status: u16,
    pub final_url: String,
    pub root: Option<Document>,
    /// Empty on success.
    pub message: String,
    pub failure: Option<FailureKind>,
}

impl FetchOutcome {
    fn parsed(final_url: String, root: Document) -> Self {
        Self {
            content_type: root.content_type(),
            status: StatusCode::OK.as_u16(),
            final_url,
            root: Some(root),
            message: String::new(),
            failure: None,
        }
    }

    fn failed(kind: FailureKind, status: u16, url: &str, message: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Unparsed,
            status,
            final_url: url.to_owned(),
            root: None,
            message: message.into(),
            failure: Some(kind),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.root.is_some()
    }

    /// Converts a failed outcome into the matching [`ScraperError`] and hands
    /// back the document of a successful one.
    ///
    /// # Errors
    ///
    /// [`ScraperError::MarkupUnparseable`] when the body could not be parsed,
    /// [`ScraperError::TransportFailure`] for everything else.
    pub fn into_document(self) -> Result<Document, ScraperError> {
        match (self.root, self.failure) {
            (Some(root), _) => Ok(root),
            (None, Some(FailureKind::MarkupUnparseable)) => Err(ScraperError::MarkupUnparseable {
                url: self.final_url,
                reason: self.message,
            }),
            (None, _) => Err(ScraperError::TransportFailure {
                url: self.final_url,
                reason: format!("{} {}", self.status, self.message),
            }),
        }
    }

    /// The error a failed outcome stands for; `None` on success.
    #[must_use]
    pub fn into_error(self) -> Option<ScraperError> {
        self.into_document().err()
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} \"{}\" ",
            self.content_type, self.status, self.final_url
        )?;
        match &self.root {
            Some(root) => write!(f, "<{}>", root.root_name()),
            None => f.write_str(&self.message),
        }
    }
}

/// Issues GET requests and parses the bodies.
///
/// Cheap to clone; clones share the underlying connection pools, including
/// the one client built per proxy address.
#[derive(Debug, Clone)]
pub struct FetchPipeline {
    client: Client,
    proxied: Arc<Mutex<HashMap<String, Client>>>,
}

impl FetchPipeline {
    /// Requests go direct unless [`FetchOptions::proxy`] says otherwise;
    /// proxy environment variables are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            client: Client::builder().no_proxy().build()?,
            proxied: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Fetches `url` once and parses the body, XML first, HTML on a
    /// well-formedness failure.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchOutcome {
        let request = match self.prepare(url, options) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(url, error = %e, "could not build request");
                return FetchOutcome::failed(
                    FailureKind::Transport,
                    STATUS_NOT_ATTEMPTED,
                    url,
                    e.to_string(),
                );
            }
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(url, &e),
        };

        let status = response.status();
        let final_url = response.url().to_string();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or("unexpected status");
            tracing::debug!(url, final_url = %final_url, status = status.as_u16(), "non-200 response");
            return FetchOutcome::failed(FailureKind::Status, status.as_u16(), &final_url, reason);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return transport_failure(&final_url, &e),
        };

        match parse_markup(&body) {
            Ok(root) => {
                tracing::debug!(
                    url = %final_url,
                    content_type = %root.content_type(),
                    bytes = body.len(),
                    "fetched"
                );
                FetchOutcome::parsed(final_url, root)
            }
            Err(e) => {
                tracing::debug!(url = %final_url, error = %e, "body is not markup");
                FetchOutcome::failed(
                    FailureKind::MarkupUnparseable,
                    status.as_u16(),
                    &final_url,
                    e.to_string(),
                )
            }
        }
    }

    /// Builds the request synchronously so the thread-local RNG never lives
    /// across an `.await`.
    fn prepare(&self, url: &str, options: &FetchOptions) -> Result<RequestBuilder, ScraperError> {
        let client = self.client_for(options.proxy.as_deref())?;

        let mut headers = HeaderMap::new();
        for header in &options.headers {
            match (
                HeaderName::from_bytes(header.name.as_bytes()),
                HeaderValue::from_str(&header.value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(name = %header.name, "skipping invalid header"),
            }
        }
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(pick_user_agent(&mut rand::rng())),
        );

        Ok(client.get(url).headers(headers).timeout(options.timeout))
    }

    /// The direct client, or the cached client for `proxy`.
    fn client_for(&self, proxy: Option<&str>) -> Result<Client, ScraperError> {
        let Some(proxy) = proxy else {
            return Ok(self.client.clone());
        };
        let mut proxied = self.proxied.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = proxied.get(proxy) {
            return Ok(client.clone());
        }
        let client = proxied_client(proxy)?;
        tracing::debug!(proxy, "built proxied client");
        proxied.insert(proxy.to_owned(), client.clone());
        Ok(client)
    }
}

fn proxied_client(proxy: &str) -> Result<Client, ScraperError> {
    let address = if proxy.contains("://") {
        proxy.to_owned()
    } else {
        format!("http://{proxy}")
    };
    Ok(Client::builder().proxy(Proxy::http(address)?).build()?)
}

fn transport_failure(url: &str, error: &reqwest::Error) -> FetchOutcome {
    let status = if let Some(status) = error.status() {
        status.as_u16()
    } else if error.is_timeout() {
        STATUS_NOT_ATTEMPTED
    } else if error.is_connect() {
        STATUS_UNREACHABLE
    } else {
        STATUS_NOT_ATTEMPTED
    };
    tracing::debug!(url, status, error = %error, "transport failure");
    FetchOutcome::failed(FailureKind::Transport, status, url, error.to_string())
}
