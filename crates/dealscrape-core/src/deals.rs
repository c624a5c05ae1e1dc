use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A deal as listed on a site's index page or feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealSummary {
    /// Main headline.
    pub title: String,
    /// Sub-headline or short description.
    pub headline: String,
    /// Deal page URL, query string removed.
    pub link: String,
    /// Site-local deal identifier taken from the link, passed through as text.
    pub rel_id: Option<String>,
    pub pub_date: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub site: String,
    pub locale: String,
    pub location: String,
    pub category: String,
    /// SHA-256 over the identifying fields; stable across re-scrapes.
    pub hashid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    /// Sold out or expired.
    Closed,
    Live,
}

impl DealStatus {
    /// Numeric form used by downstream stores: `0` closed, `1` live.
    #[must_use]
    pub fn as_flag(self) -> u8 {
        match self {
            DealStatus::Closed => 0,
            DealStatus::Live => 1,
        }
    }
}

/// A postal address recovered from free-form merchant contact lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub lines: Vec<String>,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub locale: Option<String>,
}

/// Details scraped from a single deal page.
///
/// Only `status` is populated for closed deals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDetail {
    pub status: DealStatus,
    pub merchant: Option<String>,
    pub merchant_url: Option<String>,
    pub addresses: Vec<Address>,
    /// Displayed or computed recommended retail price.
    pub rrp: Option<f64>,
    pub price: Option<f64>,
    /// Displayed number of sales.
    pub volume: Option<u64>,
}

impl DealDetail {
    #[must_use]
    pub fn closed() -> Self {
        Self {
            status: DealStatus::Closed,
            merchant: None,
            merchant_url: None,
            addresses: Vec::new(),
            rrp: None,
            price: None,
            volume: None,
        }
    }
}
