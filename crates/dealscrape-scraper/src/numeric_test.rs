use scraper::{Html, Selector};

use super::*;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// -----------------------------------------------------------------------
// extract_float_from_string
// -----------------------------------------------------------------------

#[test]
fn currency_prefixed_price() {
    assert_close(extract_float_from_string("£10.50"), 10.50);
}

#[test]
fn comma_thousands_group() {
    assert_close(extract_float_from_string("1,234"), 1234.0);
}

#[test]
fn space_thousands_group() {
    assert_close(extract_float_from_string("Sold: 1 234"), 1234.0);
    assert_close(extract_float_from_string("100 000"), 100_000.0);
}

#[test]
fn period_space_artifact_is_repaired() {
    assert_close(extract_float_from_string("10. 00"), 10.0);
    assert_close(extract_float_from_string("£24. 99"), 24.99);
}

#[test]
fn single_decimal_digit_means_tenths() {
    assert_close(extract_float_from_string("0.9"), 0.90);
    assert_close(extract_float_from_string("10.9"), 10.90);
    assert_close(extract_float_from_string("2.5k"), 2.50);
}

#[test]
fn zero_after_separator_is_treated_as_decimals() {
    assert_close(extract_float_from_string("5.0"), 5.0);
}

#[test]
fn european_format_with_thousands_and_decimals() {
    assert_close(extract_float_from_string("1.234,56 €"), 1234.56);
    assert_close(extract_float_from_string("12,99 €"), 12.99);
}

#[test]
fn english_format_with_thousands_and_decimals() {
    assert_close(extract_float_from_string("1,299.99"), 1299.99);
}

#[test]
fn plain_integer_is_the_whole_number() {
    assert_close(extract_float_from_string("1234567"), 1_234_567.0);
    assert_close(extract_float_from_string("3 for 2"), 3.0);
}

#[test]
fn first_number_wins() {
    assert_close(extract_float_from_string("Was 45.00 now 20.00"), 45.0);
}

#[test]
fn digits_glued_to_a_word_are_ignored() {
    assert_close(extract_float_from_string("x10"), 0.0);
}

#[test]
fn digits_after_non_ascii_letter_start_a_number() {
    assert_close(extract_float_from_string("à10"), 10.0);
    assert_close(extract_float_from_string("€9,99"), 9.99);
}

#[test]
fn no_digits_yields_zero() {
    assert_close(extract_float_from_string(""), 0.0);
    assert_close(extract_float_from_string("Sold out"), 0.0);
    assert_close(extract_float_from_string("£.—"), 0.0);
}

#[test]
fn non_ascii_digits_are_not_numbers() {
    assert_close(extract_float_from_string("١٢٣"), 0.0);
}

#[test]
fn arbitrary_text_never_panics() {
    for input in ["\u{0}", "....", "9".repeat(400).as_str(), "1.2.3.4.5", "€€€1"] {
        let value = extract_float_from_string(input);
        assert!(!value.is_nan(), "{input:?} -> {value}");
    }
}

// -----------------------------------------------------------------------
// extract_float_from_markup
// -----------------------------------------------------------------------

#[test]
fn markup_entities_and_tags_are_removed() {
    assert_close(
        extract_float_from_markup(r#"<span class="noWrap">&#163;49</span>"#),
        49.0,
    );
}

#[test]
fn markup_split_across_tags() {
    assert_close(
        extract_float_from_markup("<span>&#163;</span>1,299.99&#13;\n"),
        1299.99,
    );
}

#[test]
fn markup_with_line_breaks_inside_number_cell() {
    assert_close(extract_float_from_markup("<td>\n  &#8364;1,200\n<br/>&#13;</td>"), 1200.0);
}

#[test]
fn markup_without_digits_yields_zero() {
    assert_close(extract_float_from_markup("<span>&nbsp;</span>"), 0.0);
}

#[test]
fn element_serialization_goes_through_markup_cleanup() {
    let html = Html::parse_fragment(
        "<div id=\"box\"><span class=\"price\"><span class=\"noWrap\">\u{a3}19.\u{a0}99</span></span></div>",
    );
    let selector = Selector::parse("span.noWrap").unwrap();
    let price = html.select(&selector).next().unwrap();
    assert_close(extract_float_from_element(price), 19.99);
}
