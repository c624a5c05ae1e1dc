//! Text cleanup shared by the resolver, the numeric extractor and content models.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

/// Location shown when a URL carries no location code.
pub const DEFAULT_LOCATION: &str = "National";

/// Entities that show up inside numeric fields and carry no numeric meaning.
const NUMERIC_NOISE_ENTITIES: [&str; 9] = [
    "&#13;", "&#160;", "&#xa0;", "&nbsp;", "&#163;", "&pound;", "&#8364;", "&euro;", "&#x20ac;",
];

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r|\n|\u{a0}").expect("valid line break regex"));
static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\s+").expect("valid whitespace regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("valid tag regex"));

/// Drops everything from the first `?` on.
#[must_use]
pub fn strip_query_string(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Replaces CR, LF and non-breaking spaces with spaces, collapses whitespace
/// runs to a single space and trims both ends.
#[must_use]
pub fn strip_white_spaces(text: &str) -> String {
    let spaced = LINE_BREAK_RE.replace_all(text, " ");
    let collapsed = WHITESPACE_RUN_RE.replace_all(&spaced, " ");
    collapsed.trim().to_owned()
}

/// Removes the literal entities that pollute prices and counters.
#[must_use]
pub fn strip_entities(text: &str) -> String {
    NUMERIC_NOISE_ENTITIES
        .iter()
        .fold(text.to_owned(), |acc, entity| acc.replace(entity, ""))
}

/// Replaces every `<...>` span with a single space.
#[must_use]
pub fn strip_tags(markup: &str) -> String {
    TAG_RE.replace_all(markup, " ").into_owned()
}

/// Upper-cases the first character of every space-separated word; the rest
/// of each word is left untouched.
#[must_use]
pub fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Display form of a raw location code: `-` and `_` become spaces and each
/// word is capitalized. An empty code yields [`DEFAULT_LOCATION`].
#[must_use]
pub fn location_display(raw: &str) -> String {
    if raw.is_empty() {
        return DEFAULT_LOCATION.to_owned();
    }
    capitalize(&raw.replace(['-', '_'], " "))
}

/// All text under `element`, whitespace-normalized.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    strip_white_spaces(&element.text().collect::<String>())
}

/// Tags whose text [`extract_lines`] skips by default.
pub const DEFAULT_EXCLUDED_TAGS: [&str; 2] = ["a", "iframe"];

/// Every non-empty text line under `element`, in document order, without
/// duplicates. Text inside any element named in `excluded_tags` is skipped.
#[must_use]
pub fn extract_lines(element: ElementRef<'_>, excluded_tags: &[&str]) -> Vec<String> {
    let root_id = element.id();
    let mut lines: Vec<String> = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let excluded = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root_id)
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|el| excluded_tags.contains(&el.name()));
        if excluded {
            continue;
        }
        let line = strip_white_spaces(text);
        if line.is_empty() || line == "None" || lines.contains(&line) {
            continue;
        }
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    #[test]
    fn strip_query_string_keeps_left_of_first_question_mark() {
        assert_eq!(
            strip_query_string("http://example.com/deals/london/spa/1?utm=a?b"),
            "http://example.com/deals/london/spa/1"
        );
    }

    #[test]
    fn strip_query_string_without_query_is_identity() {
        assert_eq!(strip_query_string("http://example.com/a"), "http://example.com/a");
    }

    #[test]
    fn strip_white_spaces_collapses_breaks_and_nbsp() {
        assert_eq!(
            strip_white_spaces("  Spa\r\n  day\u{a0}\u{a0}for   two  "),
            "Spa day for two"
        );
    }

    #[test]
    fn strip_white_spaces_of_blank_is_empty() {
        assert_eq!(strip_white_spaces(" \n\t "), "");
    }

    #[test]
    fn strip_entities_removes_currency_and_spacing_entities() {
        assert_eq!(strip_entities("&#163;10&#160;000&#13;"), "10000");
        assert_eq!(strip_entities("&euro;&nbsp;5"), "5");
    }

    #[test]
    fn strip_tags_replaces_each_tag_with_a_space() {
        assert_eq!(strip_tags("<span>10</span><sup>50</sup>"), " 10  50 ");
    }

    #[test]
    fn capitalize_upper_cases_word_starts_only() {
        assert_eq!(capitalize("london special"), "London Special");
        assert_eq!(capitalize("mcDonald's town"), "McDonald's Town");
    }

    #[test]
    fn capitalize_tolerates_repeated_spaces() {
        assert_eq!(capitalize("a  b"), "A  B");
    }

    #[test]
    fn location_display_replaces_separators() {
        assert_eq!(location_display("milton-keynes"), "Milton Keynes");
        assert_eq!(location_display("st_albans"), "St Albans");
    }

    #[test]
    fn location_display_defaults_when_empty() {
        assert_eq!(location_display(""), DEFAULT_LOCATION);
    }

    #[test]
    fn element_text_joins_and_normalizes() {
        let html = Html::parse_fragment("<h2> The   <b>Spa</b>\n Club </h2>");
        let selector = Selector::parse("h2").unwrap();
        let h2 = html.select(&selector).next().unwrap();
        assert_eq!(element_text(h2), "The Spa Club");
    }

    #[test]
    fn extract_lines_skips_links_and_duplicates() {
        let html = Html::parse_fragment(
            r#"<div class="c">
                 <h2>Spa Club</h2>
                 <a href="http://spa.example">Visit website</a>
                 <p>12 High Street<br>London<br>London</p>
                 <iframe>map</iframe>
                 <span>None</span>
               </div>"#,
        );
        let selector = Selector::parse("div.c").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(
            extract_lines(div, &DEFAULT_EXCLUDED_TAGS),
            vec!["Spa Club", "12 High Street", "London"]
        );
    }
}
