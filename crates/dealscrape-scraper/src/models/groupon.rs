//! Groupon (EU): RSS feed listing and deal page details.
//!
//! The feed is strict XML. Each `<item>` carries an HTML description that
//! either describes one deal or, for multi-offer items, holds one `<ul>` per
//! offer. Deal pages are loose HTML.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use dealscrape_core::{Address, DealDetail, DealStatus, DealSummary};
use futures::future::BoxFuture;
use scraper::{ElementRef, Html, Node, Selector};

use crate::address::clean_address_lines;
use crate::error::ScraperError;
use crate::fetch::{Document, FetchOutcome, XmlElement};
use crate::hash::deal_hash;
use crate::model::{ContentModel, ScrapeContext, UrlInfo};
use crate::numeric::extract_float_from_element;
use crate::resolver::ResolvedContext;
use crate::text::{
    element_text, extract_lines, location_display, strip_query_string, strip_white_spaces,
    DEFAULT_EXCLUDED_TAGS, DEFAULT_LOCATION,
};

/// Id used in target configuration.
pub const PARSER_ID: &str = "groupon";

const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";
const FEED_ITEMS: &str = "channel/item";

const TIME_LEFT: &str = "input#currentTimeLeft";
const MERCHANT_CONTACT: &str = "div.merchantContact";
const MERCHANT_NAME: &str = "h2.subHeadline";
const PRICE: &str = "div#contentDealBuyBox > span.price > span.noWrap";
const SAVINGS: &str = "div#contentDealBuyBox > table.savings tr.row2 > td";
const SOLD_AMOUNT: &str = "span#jDealSoldAmount";

static TIME_LEFT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(TIME_LEFT).expect("valid Groupon selector"));
static MERCHANT_CONTACT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(MERCHANT_CONTACT).expect("valid Groupon selector"));
static MERCHANT_NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(MERCHANT_NAME).expect("valid Groupon selector"));
static PRICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(PRICE).expect("valid Groupon selector"));
static SAVINGS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(SAVINGS).expect("valid Groupon selector"));
static SOLD_AMOUNT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(SOLD_AMOUNT).expect("valid Groupon selector"));
static OFFER_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul > a").expect("valid Groupon selector"));
static OFFER_LIST_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul").expect("valid Groupon selector"));

#[derive(Debug, Clone, Copy, Default)]
pub struct GrouponModel;

impl ContentModel for GrouponModel {
    fn name(&self) -> &str {
        "Groupon (EU)"
    }

    /// Two or more captures read as `(location code, deal id)`. A lone
    /// capture is the deal id of a channel without locations.
    fn url_info_hook(&self, context: &ResolvedContext) -> UrlInfo {
        match context.captures.as_slice() {
            [] => UrlInfo::default(),
            [rel_id] => UrlInfo {
                location: Some(DEFAULT_LOCATION.to_owned()),
                category: None,
                rel_id: Some(rel_id.clone()),
            },
            [code, rel_id, ..] => match context.location_map.get(code) {
                Some(entry) => UrlInfo {
                    location: Some(entry.location.clone()),
                    category: Some(entry.category.clone()),
                    rel_id: Some(rel_id.clone()),
                },
                None => UrlInfo {
                    location: Some(location_display(code)),
                    category: None,
                    rel_id: Some(rel_id.clone()),
                },
            },
        }
    }

    fn list_deals<'a>(
        &'a self,
        ctx: &'a ScrapeContext,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Vec<DealSummary>, ScraperError>> {
        Box::pin(async move {
            let outcome = ctx.fetch(url).await;
            self.deals_from_feed(ctx, outcome)
        })
    }

    fn get_deal_detail<'a>(
        &'a self,
        ctx: &'a ScrapeContext,
        url: &'a str,
    ) -> BoxFuture<'a, Result<DealDetail, ScraperError>> {
        Box::pin(async move {
            let outcome = ctx.fetch(url).await;
            let locale = ctx
                .resolve_with(self, url)
                .map(|context| context.locale)
                .unwrap_or_default();
            detail_from_page(url, &locale, outcome)
        })
    }
}

impl GrouponModel {
    fn deals_from_feed(
        &self,
        ctx: &ScrapeContext,
        outcome: FetchOutcome,
    ) -> Result<Vec<DealSummary>, ScraperError> {
        let url = outcome.final_url.clone();
        let Document::Xml(root) = outcome.into_document()? else {
            return Err(ScraperError::MarkupUnparseable {
                url,
                reason: "Groupon feed is not XML".to_owned(),
            });
        };
        if root.name() != "rss" {
            tracing::debug!(url = %url, root = root.name(), "not an RSS feed");
            return Ok(Vec::new());
        }

        let mut deals = Vec::new();
        for item in root.find_all(FEED_ITEMS) {
            for offer in read_item(&url, item)? {
                match self.summarize(ctx, offer) {
                    Ok(deal) => deals.push(deal),
                    Err(e) => tracing::debug!(url = %url, error = %e, "skipping offer"),
                }
            }
        }
        tracing::debug!(url = %url, count = deals.len(), "listed Groupon deals");
        Ok(deals)
    }

    fn summarize(&self, ctx: &ScrapeContext, offer: Offer) -> Result<DealSummary, ScraperError> {
        let context = ctx.resolve_with(self, &offer.link)?;
        let pub_date = offer.pub_date.map(|d| d.to_string()).unwrap_or_default();
        let hashid = deal_hash(&[
            offer.title.as_str(),
            offer.headline.as_str(),
            pub_date.as_str(),
            context.rel_id.as_deref().unwrap_or_default(),
            context.site.as_str(),
            context.locale.as_str(),
            context.location.as_str(),
            context.category.as_str(),
        ]);
        Ok(DealSummary {
            title: offer.title,
            headline: offer.headline,
            link: offer.link,
            rel_id: context.rel_id,
            pub_date: offer.pub_date,
            description: None,
            site: context.site,
            locale: context.locale,
            location: context.location,
            category: context.category,
            hashid,
        })
    }
}

/// One offer read out of a feed item, before resolution.
#[derive(Debug, Clone, PartialEq)]
struct Offer {
    title: String,
    headline: String,
    link: String,
    pub_date: Option<NaiveDateTime>,
}

fn required_child<'x>(
    url: &str,
    item: &'x XmlElement,
    field: &str,
    name: &str,
) -> Result<&'x XmlElement, ScraperError> {
    item.child(name)
        .ok_or_else(|| ScraperError::missing(url, field, &format!("rss/{FEED_ITEMS}/{name}")))
}

fn read_item(url: &str, item: &XmlElement) -> Result<Vec<Offer>, ScraperError> {
    let title = strip_white_spaces(&required_child(url, item, "title", "title")?.text());
    let link = strip_query_string(&strip_white_spaces(
        &required_child(url, item, "link", "link")?.text(),
    ))
    .to_owned();
    let pub_date = parse_pub_date(&required_child(url, item, "pubDate", "pubDate")?.text());
    let description = item.child("description").map(XmlElement::text).unwrap_or_default();

    let fragment = Html::parse_fragment(&description);
    if fragment.select(&OFFER_LINK_SEL).nth(1).is_none() {
        return Ok(vec![Offer {
            title,
            headline: element_text(fragment.root_element()),
            link,
            pub_date,
        }]);
    }

    Ok(fragment
        .select(&OFFER_LIST_SEL)
        .filter_map(|list| {
            let anchor = child_elements(list).find(|el| el.value().name() == "a")?;
            let href = anchor.value().attr("href")?;
            Some(Offer {
                title: element_text(anchor),
                headline: text_after_first_break(list),
                link: strip_query_string(href).to_owned(),
                pub_date,
            })
        })
        .collect())
}

/// `pubDate` is RFC 822 with a literal ` GMT` zone.
fn parse_pub_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = strip_white_spaces(raw);
    let trimmed = raw.strip_suffix(" GMT").unwrap_or(&raw);
    match NaiveDateTime::parse_from_str(trimmed, PUB_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(pub_date = %raw, error = %e, "unparseable pubDate");
            None
        }
    }
}

fn child_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Text directly following the first `<br>` child, up to the next element.
fn text_after_first_break(list: ElementRef<'_>) -> String {
    let Some(br) = child_elements(list).find(|el| el.value().name() == "br") else {
        return String::new();
    };
    let tail: String = br
        .next_siblings()
        .map_while(|node| match node.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();
    strip_white_spaces(&tail)
}

fn detail_from_page(
    url: &str,
    locale: &str,
    outcome: FetchOutcome,
) -> Result<DealDetail, ScraperError> {
    let Document::Html(page) = outcome.into_document()? else {
        return Err(ScraperError::MarkupUnparseable {
            url: url.to_owned(),
            reason: "Groupon deal page is not HTML".to_owned(),
        });
    };
    read_detail(url, locale, &page)
}

fn read_detail(url: &str, locale: &str, page: &Html) -> Result<DealDetail, ScraperError> {
    if page.select(&TIME_LEFT_SEL).next().is_none() {
        return Ok(DealDetail::closed());
    }

    let contact = page
        .select(&MERCHANT_CONTACT_SEL)
        .last()
        .ok_or_else(|| ScraperError::missing(url, "merchantContact", MERCHANT_CONTACT))?;
    let merchant = page
        .select(&MERCHANT_NAME_SEL)
        .next()
        .map(element_text)
        .ok_or_else(|| ScraperError::missing(url, "merchant", MERCHANT_NAME))?;
    let merchant_url = child_elements(contact)
        .filter(|el| el.value().name() == "a")
        .last()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_owned);
    let addresses = contact_address(contact, locale).into_iter().collect();

    let price = page
        .select(&PRICE_SEL)
        .last()
        .map(extract_float_from_element)
        .ok_or_else(|| ScraperError::missing(url, "price", PRICE))?;
    let savings = page
        .select(&SAVINGS_SEL)
        .nth(1)
        .map_or(0.0, extract_float_from_element);
    let volume = page
        .select(&SOLD_AMOUNT_SEL)
        .last()
        .map(extract_float_from_element)
        .map(truncate_count)
        .ok_or_else(|| ScraperError::missing(url, "volume", SOLD_AMOUNT))?;

    Ok(DealDetail {
        status: DealStatus::Live,
        merchant: Some(merchant),
        merchant_url,
        addresses,
        rrp: Some(price + savings),
        price: Some(price),
        volume: Some(volume),
    })
}

/// Contact lines split on commas, cleaned when the locale has address rules.
fn contact_address(contact: ElementRef<'_>, locale: &str) -> Option<Address> {
    let raw: Vec<String> = extract_lines(contact, &DEFAULT_EXCLUDED_TAGS)
        .iter()
        .flat_map(|line| line.split(','))
        .map(strip_white_spaces)
        .filter(|part| !part.is_empty())
        .collect();
    if raw.is_empty() {
        return None;
    }
    Some(clean_address_lines(&raw, locale).unwrap_or(Address {
        lines: raw,
        ..Address::default()
    }))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_count(value: f64) -> u64 {
    value.max(0.0).trunc() as u64
}

#[cfg(test)]
#[path = "groupon_test.rs"]
mod tests;
