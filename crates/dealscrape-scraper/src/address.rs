//! Postal address recovery from free-form merchant contact lines.
//!
//! Cleaning is region-specific and keyed on the region half of the locale
//! (`en_GB` → `gb`). An address is only returned when a postcode was found.

use std::sync::LazyLock;

use dealscrape_core::Address;
use regex::Regex;

const GB_OUTCODE: &str =
    "[A-PR-UWYZ](?:[0-9]{1,2}|[A-HIK-Y][0-9](?:[0-9]|[ABEHMNPRVWXY])?|[0-9][A-HJKSTUW])";
const GB_INCODE: &str = "[0-9][ABD-HJLNP-UW-Z]{2}";

static GB_POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(GIR 0AA|{GB_OUTCODE} {GB_INCODE})")).expect("valid GB postcode regex")
});
static GB_INCODE_SPACING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(" *({GB_INCODE})$")).expect("valid GB incode regex")
});
static GB_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("([0-9]{11})").expect("valid GB phone regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static GB_EXCLUDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|.]|Returns:").expect("valid excluded values regex"));

/// Placeholder some sites print in empty address fields.
const INVALID_VALUE: &str = "None";

/// Cleans `lines` with the rules for `locale`'s region.
///
/// Returns `None` for regions without rules and for addresses that carry no
/// postcode. The postcode is removed from the returned lines.
#[must_use]
pub fn clean_address_lines(lines: &[String], locale: &str) -> Option<Address> {
    let region = locale.get(3..).unwrap_or_default().to_ascii_lowercase();
    let mut address = match region.as_str() {
        "gb" => clean_gb_lines(lines),
        _ => {
            tracing::trace!(locale, "no address rules for region");
            return None;
        }
    };

    let postcode = address.postcode.clone()?;
    address.lines = address
        .lines
        .iter()
        .map(|line| line.replace(&postcode, "").trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect();
    address.locale = Some(locale.to_owned());
    Some(address)
}

fn clean_gb_lines(lines: &[String]) -> Address {
    let mut address = Address::default();
    for line in lines {
        let compact = WHITESPACE_RE.replace_all(line, "");
        if let Some(phone) = GB_PHONE_RE.captures(&compact).and_then(|c| c.get(1)) {
            address.phone = Some(phone.as_str().to_owned());
            continue;
        }

        let upper = line.trim().to_uppercase();
        let spaced = GB_INCODE_SPACING_RE.replace(&upper, " $1");
        if let Some(postcode) = GB_POSTCODE_RE.captures(&spaced).and_then(|c| c.get(1)) {
            address.postcode = Some(postcode.as_str().to_owned());
        }

        let value = GB_EXCLUDED_RE.replace_all(line, "").trim().to_owned();
        if !value.contains(INVALID_VALUE) {
            address.lines.push(value);
        }
    }
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn gb_address_extracts_postcode_and_phone() {
        let address = clean_address_lines(
            &lines(&["The Spa", "12 High Street", "London", "SW1A 1AA", "020 7946 0018"]),
            "en_GB",
        )
        .unwrap();
        assert_eq!(address.postcode.as_deref(), Some("SW1A 1AA"));
        assert_eq!(address.phone.as_deref(), Some("02079460018"));
        assert_eq!(address.lines, vec!["The Spa", "12 High Street", "London"]);
        assert_eq!(address.locale.as_deref(), Some("en_GB"));
    }

    #[test]
    fn postcode_is_stripped_from_the_line_that_carries_it() {
        let address = clean_address_lines(&lines(&["Leeds LS1 4DY"]), "en_GB").unwrap();
        assert_eq!(address.postcode.as_deref(), Some("LS1 4DY"));
        assert_eq!(address.lines, vec!["Leeds"]);
    }

    #[test]
    fn missing_space_before_incode_is_restored() {
        let address = clean_address_lines(&lines(&["Street", "M11AE"]), "en_GB").unwrap();
        assert_eq!(address.postcode.as_deref(), Some("M1 1AE"));
    }

    #[test]
    fn girobank_postcode_is_recognised() {
        let address = clean_address_lines(&lines(&["Bootle", "GIR 0AA"]), "en_GB").unwrap();
        assert_eq!(address.postcode.as_deref(), Some("GIR 0AA"));
    }

    #[test]
    fn excluded_characters_and_none_lines_are_dropped() {
        let address = clean_address_lines(
            &lines(&["Unit 4.", "Returns: Mill Lane |", "None", "B1 1AA"]),
            "en_GB",
        )
        .unwrap();
        assert_eq!(address.lines, vec!["Unit 4", "Mill Lane"]);
    }

    #[test]
    fn no_postcode_means_no_address() {
        assert!(clean_address_lines(&lines(&["Somewhere", "01234567890"]), "en_GB").is_none());
    }

    #[test]
    fn unknown_region_has_no_rules() {
        assert!(clean_address_lines(&lines(&["1 Rue de Rivoli", "75001 Paris"]), "fr_FR").is_none());
        assert!(clean_address_lines(&lines(&["SW1A 1AA"]), "en").is_none());
    }
}
