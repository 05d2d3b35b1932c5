//! Display-name rewriting for provider field keys.
//!
//! The provider uses camelCase keys; stored documents and the public
//! surface use "Title Case With Spaces". The transform inserts a space
//! before every capital letter and then title-cases the result, so
//! abbreviation runs split letter by letter (`annualBasicEPS` ->
//! `Annual Basic E P S`). It must stay character-for-character stable:
//! existing stored data was written with exactly these names.

/// Provider keys whose acronym arrives lowercased, so the generic
/// transform cannot recover the letter-by-letter spelling the stored
/// data uses.
const ACRONYM_OVERRIDES: &[(&str, &str)] = &[
    ("epsTrailingTwelveMonths", "E P S Trailing Twelve Months"),
    ("epsForward", "E P S Forward"),
    ("epsCurrentYear", "E P S Current Year"),
    ("priceEpsCurrentYear", "Price E P S Current Year"),
];

/// Rewrite a camelCase provider key to its display name.
///
/// ```
/// use marketvault::models::display_name;
/// assert_eq!(display_name("regularMarketDayHigh"), "Regular Market Day High");
/// assert_eq!(display_name("epsTrailingTwelveMonths"), "E P S Trailing Twelve Months");
/// ```
pub fn display_name(key: &str) -> String {
    if let Some((_, display)) = ACRONYM_OVERRIDES.iter().find(|(k, _)| *k == key) {
        return (*display).to_string();
    }

    let mut spaced = String::with_capacity(key.len() * 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }
    title_case(&spaced)
}

/// Title-case with Python `str.title()` semantics: an alphabetic character
/// following a non-alphabetic one is uppercased, every other alphabetic
/// character is lowercased.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alphabetic = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_camel_case() {
        assert_eq!(display_name("regularMarketDayHigh"), "Regular Market Day High");
        assert_eq!(display_name("exchangeName"), "Exchange Name");
        assert_eq!(display_name("firstTradeDate"), "First Trade Date");
        assert_eq!(display_name("assetProfile"), "Asset Profile");
    }

    #[test]
    fn test_abbreviation_runs_split_per_letter() {
        assert_eq!(display_name("annualBasicEPS"), "Annual Basic E P S");
        assert_eq!(display_name("annualGrossPPE"), "Annual Gross P P E");
        assert_eq!(display_name("annualEBITDA"), "Annual E B I T D A");
    }

    #[test]
    fn test_lowercased_acronym_overrides() {
        assert_eq!(
            display_name("epsTrailingTwelveMonths"),
            "E P S Trailing Twelve Months"
        );
        assert_eq!(display_name("epsForward"), "E P S Forward");
    }

    #[test]
    fn test_single_word() {
        assert_eq!(display_name("currency"), "Currency");
        assert_eq!(display_name("gmtoffset"), "Gmtoffset");
    }
}
