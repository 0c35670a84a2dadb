//! Internal helpers for input validation and search matching.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every entity enforces the same field rules and messages.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::FieldErrors;

pub(crate) const REQUIRED_MESSAGE: &str = "This field is required.";

/// Trim an optional text input, mapping blank values to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Validate a required, length-bounded text field.
///
/// Returns the trimmed value; problems are recorded in `errors`.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_length: usize,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
    } else {
        check_length(errors, field, trimmed, max_length);
    }
    trimmed.to_string()
}

/// Validate an optional, length-bounded text field.
pub(crate) fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_length: usize,
) -> Option<String> {
    let value = normalize_optional_text(value);
    if let Some(text) = value.as_deref() {
        check_length(errors, field, text, max_length);
    }
    value
}

/// Length is counted in characters, not bytes.
pub(crate) fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max_length: usize) {
    let len = value.chars().count();
    if len > max_length {
        errors.add(
            field,
            format!("Ensure this value has at most {max_length} characters (it has {len})."),
        );
    }
}

/// Fold text for case and accent insensitive matching.
pub(crate) fn search_key(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

/// Split a search query into folded terms.
pub(crate) fn search_terms(query: Option<&str>) -> Vec<String> {
    query
        .map(|q| q.split_whitespace().map(search_key).collect())
        .unwrap_or_default()
}

/// Every term must be contained in at least one of the fields.
pub(crate) fn matches_terms<'a>(
    terms: &[String],
    fields: impl IntoIterator<Item = Option<&'a str>>,
) -> bool {
    if terms.is_empty() {
        return true;
    }
    let folded: Vec<String> = fields.into_iter().flatten().map(search_key).collect();
    terms
        .iter()
        .all(|term| folded.iter().any(|field| field.contains(term.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(normalize_optional_text(Some(" HR ")), Some("HR".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn required_text_reports_missing_and_too_long() {
        let mut errors = FieldErrors::new();
        required_text(&mut errors, "title", "  ", 10);
        required_text(&mut errors, "status", &"Q".repeat(51), 50);
        assert_eq!(errors.get("title"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
        assert!(errors.contains("status"));
    }

    #[test]
    fn length_counts_characters() {
        let mut errors = FieldErrors::new();
        check_length(&mut errors, "last_name", &"Ж".repeat(50), 50);
        assert!(errors.is_empty());
    }

    #[test]
    fn search_is_case_and_accent_insensitive() {
        let terms = search_terms(Some("IVAN  éco"));
        assert_eq!(terms, vec!["ivan".to_string(), "eco".to_string()]);
        assert!(matches_terms(&terms, [Some("Ivanov"), Some("Écologie")]));
        assert!(!matches_terms(&terms, [Some("Ivanov"), None]));
    }

    #[test]
    fn cyrillic_terms_match_regardless_of_case() {
        let terms = search_terms(Some("ИВАНОВ"));
        assert!(matches_terms(&terms, [Some("Иванов")]));
    }
}
