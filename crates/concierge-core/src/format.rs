//! Response post-processing applied once to raw model text before it is
//! stored as an AI turn.
//!
//! The persona asks the model for `<strong>`/`<br/>` markup, but models
//! still answer in markdown often enough that bold markers have to be
//! converted and any leftover asterisks dropped.

use regex::Regex;
use std::sync::OnceLock;

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    // (?s) so a bold run may cross a line break
    BOLD.get_or_init(|| Regex::new(r"(?s)\*\*(.+?)\*\*").expect("static regex"))
}

/// Convert `**X**` to `<strong>X</strong>` and strip any remaining `*`.
///
/// Pairs are matched leftmost-first and non-greedy. Existing markup passes
/// through untouched. No asterisks survive, so the function is idempotent.
pub fn format_response(raw: &str) -> String {
    let emphasized = bold_pattern().replace_all(raw, "<strong>$1</strong>");
    emphasized.replace('*', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bold_vessel_name() {
        assert_eq!(
            format_response("**75' Daddy's Dollar**"),
            "<strong>75' Daddy's Dollar</strong>"
        );
    }

    #[test]
    fn test_multiple_pairs_are_non_greedy() {
        assert_eq!(
            format_response("**Eden** or **Julianne**?"),
            "<strong>Eden</strong> or <strong>Julianne</strong>?"
        );
    }

    #[test]
    fn test_stray_asterisks_are_stripped() {
        assert_eq!(format_response("*Relax* in style **now"), "Relax in style now");
        assert_eq!(format_response("****"), "");
    }

    #[test]
    fn test_existing_markup_passes_through() {
        let text = "<strong>Squalo</strong><br/>Thrills await.";
        assert_eq!(format_response(text), text);
    }

    #[test]
    fn test_bold_spanning_lines() {
        assert_eq!(
            format_response("**Junkanoo\nFestival**"),
            "<strong>Junkanoo\nFestival</strong>"
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain text",
            "**87' Squalo** is perfect.",
            "***triple*** and **unclosed",
            "a * b ** c *** d",
            "<br/>**x**<strong>y</strong>*",
            "ñandú **Ünïcode** 🌴*",
        ];
        for raw in samples {
            let once = format_response(raw);
            assert_eq!(format_response(&once), once, "input: {:?}", raw);
            assert!(!once.contains('*'));
        }
    }

    /// Model-ish text: words, markdown markers, markup, line breaks
    fn arb_reply() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-zA-Z0-9' .,!?]{1,12}",
                Just("*".to_string()),
                Just("**".to_string()),
                Just("***".to_string()),
                Just("<strong>".to_string()),
                Just("</strong>".to_string()),
                Just("<br/>".to_string()),
                Just("\n".to_string()),
                "[ñü🌴]{1,3}",
            ],
            0..24,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn test_format_is_idempotent_and_strips_asterisks(raw in arb_reply()) {
            let once = format_response(&raw);
            prop_assert!(!once.contains('*'), "asterisk survived: {:?}", once);
            prop_assert_eq!(format_response(&once), once);
        }

        #[test]
        fn test_format_is_idempotent_on_arbitrary_text(raw in any::<String>()) {
            let once = format_response(&raw);
            prop_assert!(!once.contains('*'));
            prop_assert_eq!(format_response(&once), once);
        }
    }
}
