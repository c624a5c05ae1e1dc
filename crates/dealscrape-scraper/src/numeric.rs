//! Best-effort number recovery from prices, savings and sales counters.
//!
//! Source pages mix `1,234.56`, `1.234,56`, `1 234` and `10. 00` freely, so
//! there is no locale-aware parse here. A three-group positional heuristic
//! decides which digit run is thousands, units or decimals. Results for
//! ambiguous input are approximate.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::text::{strip_entities, strip_tags, strip_white_spaces};

/// A digit followed by `". "`; some feeds render `10.00` as `10. 00`.
static PERIOD_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9])\. ").expect("valid period-space regex"));

/// Leading digit run, then up to three digits, then up to two digits, each
/// optionally preceded by one non-digit separator. The word boundary is
/// ASCII-only, so a digit run right after an accented letter still starts a
/// number.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)([0-9]+)[^0-9]?([0-9]{0,3})[^0-9]?([0-9]{0,2})")
        .expect("valid number regex")
});

/// Extracts a number from a fragment of markup (for example the serialized
/// price element of a deal page).
///
/// Known noise entities are removed, tags become spaces, whitespace is
/// collapsed, and the result goes through [`extract_float_from_string`].
/// Never fails; returns `0.0` when no digits are found.
#[must_use]
pub fn extract_float_from_markup(markup: &str) -> f64 {
    let without_entities = strip_entities(markup);
    let without_tags = strip_tags(&without_entities);
    extract_float_from_string(&strip_white_spaces(&without_tags))
}

/// Extracts a number from a parsed HTML element, markup included.
#[must_use]
pub fn extract_float_from_element(element: ElementRef<'_>) -> f64 {
    extract_float_from_markup(&element.html())
}

/// Extracts a number from already-cleaned text.
///
/// Grouping rules, applied to the first match of [`NUMBER_RE`]
/// (`G1` leading digits, `G2` up to three digits, `G3` up to two digits):
///
/// | Input       | G1     | G2    | G3   | Result     |
/// |-------------|--------|-------|------|------------|
/// | `"1234"`    | `1234` |       |      | `1234.0`   |
/// | `"10.50"`   | `10`   | `50`  |      | `10.50`    |
/// | `"10.5"`    | `10`   | `5`   |      | `10.50`    |
/// | `"1,234"`   | `1`    | `234` |      | `1234.0`   |
/// | `"1.234,56"`| `1`    | `234` | `56` | `1234.56`  |
///
/// A two-digit-or-shorter `G2` is read as decimals unless `G3` already holds
/// decimals. A single decimal digit means tenths.
#[must_use]
pub fn extract_float_from_string(text: &str) -> f64 {
    let text = PERIOD_SPACE_RE.replace_all(text, "${1}.");
    let Some(caps) = NUMBER_RE.captures(&text) else {
        return 0.0;
    };

    let group = |idx: usize| caps.get(idx).map_or("", |m| m.as_str());
    let leading = group(1);
    let middle = group(2);
    let closing = group(3);
    let has_middle = !middle.is_empty();
    let has_closing = !closing.is_empty();

    let mut decimals = if has_closing { closing } else { "0" };
    let mut digits = if has_middle { middle } else { "0" };

    // Three digits, or decimals already found in G3: G2 is a hundreds group.
    // Otherwise G2 is the decimal part.
    if has_middle && digits.len() < 3 && decimals == "0" {
        decimals = digits;
        digits = "0";
    }

    let decimals = if decimals.len() < 2 {
        format!("{decimals}0")
    } else {
        decimals.to_owned()
    };

    let (thousands, digits) = match (has_middle, has_closing) {
        (false, false) => ("0", leading),
        (true, false) if digits == "0" => ("0", leading),
        _ => (leading, digits),
    };

    digit_value(thousands) * 1000.0 + digit_value(digits) + digit_value(&decimals) / 100.0
}

fn digit_value(digits: &str) -> f64 {
    digits.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
#[path = "numeric_test.rs"]
mod tests;
