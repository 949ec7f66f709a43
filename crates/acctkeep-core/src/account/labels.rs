//! Label parsing and formatting.
//!
//! Labels are edited as a single line of text separated by semicolons,
//! e.g. `"prod; ops; billing"`.

use super::model::AccountLabel;

/// Separator between labels in the text form.
const SEPARATOR: char = ';';

/// Separator used when formatting labels back to text.
const JOINER: &str = "; ";

/// Parse a semicolon-separated string into labels.
///
/// Each segment is trimmed and empty segments are dropped, so
/// `" a ;; b; "` yields `["a", "b"]`.
#[must_use]
pub fn parse_labels(text: &str) -> Vec<AccountLabel> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    text.split(SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(AccountLabel::new)
        .collect()
}

/// Format labels as a `"; "`-separated string.
#[must_use]
pub fn labels_to_string(labels: &[AccountLabel]) -> String {
    labels
        .iter()
        .map(|label| label.text.as_str())
        .collect::<Vec<_>>()
        .join(JOINER)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect
)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn texts(labels: &[AccountLabel]) -> Vec<&str> {
        labels.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn parse_simple() {
        let labels = parse_labels("a;b;c");
        assert_eq!(texts(&labels), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_trims_and_drops_empty() {
        let labels = parse_labels("  prod ;; ops ;  ; ");
        assert_eq!(texts(&labels), vec!["prod", "ops"]);
    }

    #[test]
    fn parse_keeps_inner_spaces() {
        let labels = parse_labels("team a; team b");
        assert_eq!(texts(&labels), vec!["team a", "team b"]);
    }

    #[test]
    fn parse_blank_input() {
        assert!(parse_labels("").is_empty());
        assert!(parse_labels("   \t ").is_empty());
        assert!(parse_labels(";;;").is_empty());
    }

    #[test]
    fn format_joins_with_separator() {
        let labels = vec![AccountLabel::new("a"), AccountLabel::new("b")];
        assert_eq!(labels_to_string(&labels), "a; b");
    }

    #[test]
    fn format_empty() {
        assert_eq!(labels_to_string(&[]), "");
    }

    #[test]
    fn irregular_spacing_is_normalized() {
        let labels = parse_labels("a ;b;   c");
        assert_eq!(labels_to_string(&labels), "a; b; c");
    }

    proptest! {
        #[test]
        fn reparse_is_stable(s in "[a-z ;\\t]{0,40}") {
            let once = parse_labels(&s);
            let twice = parse_labels(&labels_to_string(&once));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn parsed_labels_are_trimmed_and_non_empty(s in "\\PC{0,60}") {
            for label in parse_labels(&s) {
                prop_assert!(!label.text.is_empty());
                prop_assert_eq!(label.text.trim(), label.text.as_str());
                prop_assert!(!label.text.contains(';'));
            }
        }
    }
}
