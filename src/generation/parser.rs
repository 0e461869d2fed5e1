//! Tolerant parsing of generated numbered-list output.
//!
//! The upstream generator is not guaranteed to emit strictly formatted
//! text, so parsing is line-oriented and forgiving: non-matching lines
//! (preambles, blanks, trailing commentary) are skipped silently, short
//! results are returned as-is for the caller to judge, and nothing here
//! ever errors. Structured-JSON repair is deliberately not attempted;
//! the numbered-list contract is the only format.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Supporting sentence used when a hook line arrives without a delimiter.
/// A usable headline is still better than a dropped line.
const GENERIC_SUPPORTING: &str = "A complement to your wellness journey.";

/// A two-part hook: short headline plus supporting sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookCopy {
    /// Short punchy headline (goes on the image)
    pub main: String,
    /// Elaborating sentence
    pub supporting: String,
}

fn item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]\s+(.+)$").expect("item regex"))
}

/// Strip markdown emphasis markers and surrounding quote characters
fn clean_item(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| *c != '*').collect();
    const QUOTES: &[char] = &['"', '\''];
    let item = stripped.trim();
    let item = item.strip_prefix(QUOTES).unwrap_or(item);
    let item = item.strip_suffix(QUOTES).unwrap_or(item);
    item.trim().to_string()
}

/// Extract up to `expected` items from numbered lines (`1. item` or
/// `2) item`), in encounter order. Returns fewer items when fewer valid
/// lines exist; never pads, never errors.
pub fn parse_numbered_list(text: &str, expected: usize) -> Vec<String> {
    let mut items = Vec::with_capacity(expected);
    for line in text.lines() {
        if items.len() == expected {
            break;
        }
        if let Some(caps) = item_regex().captures(line.trim_start()) {
            let item = clean_item(&caps[1]);
            if !item.is_empty() {
                items.push(item);
            }
        }
    }
    items
}

/// Extract up to `expected` two-part items from numbered lines where the
/// parts are separated by `|`. A matched line without the delimiter keeps
/// the whole remainder as `main` with a generic supporting sentence.
pub fn parse_paired_list(text: &str, expected: usize) -> Vec<HookCopy> {
    let mut items = Vec::with_capacity(expected);
    for line in text.lines() {
        if items.len() == expected {
            break;
        }
        let Some(caps) = item_regex().captures(line.trim_start()) else {
            continue;
        };
        let remainder = &caps[1];
        let hook = match remainder.split_once('|') {
            Some((main, supporting)) => HookCopy {
                main: clean_item(main),
                supporting: clean_item(supporting),
            },
            None => HookCopy {
                main: clean_item(remainder),
                supporting: GENERIC_SUPPORTING.to_string(),
            },
        };
        if !hook.main.is_empty() {
            items.push(hook);
        }
    }
    items
}

/// Treat the whole response as a single free-form item (used for image
/// prompts). Strips a leading numbered marker if the model added one.
/// Returns an empty vec when the trimmed text is shorter than `min_len`,
/// which the caller counts as a parse shortfall.
pub fn parse_free_form(text: &str, min_len: usize) -> Vec<String> {
    let trimmed = text.trim();
    let body = match item_regex().captures(trimmed) {
        Some(caps) => clean_item(&caps[1]),
        None => trimmed.to_string(),
    };
    if body.len() < min_len {
        return Vec::new();
    }
    vec![body]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_numbered_list() {
        let text = "1. First angle\n2. Second angle\n3. Third angle";
        let items = parse_numbered_list(text, 3);
        assert_eq!(items, vec!["First angle", "Second angle", "Third angle"]);
    }

    #[test]
    fn test_parse_paren_style_numbering() {
        let text = "1) One\n2) Two";
        assert_eq!(parse_numbered_list(text, 2), vec!["One", "Two"]);
    }

    #[test]
    fn test_skips_preamble_and_commentary() {
        let text = "Here are your angles:\n\n1. Gut Reset\n2. No Needles\n3. Feel Better\n\nHope these help!";
        let items = parse_numbered_list(text, 3);
        assert_eq!(items, vec!["Gut Reset", "No Needles", "Feel Better"]);
    }

    #[test]
    fn test_strips_markdown_and_quotes() {
        let text = "1. **\"Gut Reset\"**\n2. *Skip The Doctor*\n3. 'Clean Energy'";
        let items = parse_numbered_list(text, 3);
        assert_eq!(items, vec!["Gut Reset", "Skip The Doctor", "Clean Energy"]);
    }

    #[test]
    fn test_truncates_to_expected_count() {
        let text = "1. a\n2. b\n3. c\n4. d\n5. e";
        assert_eq!(parse_numbered_list(text, 3).len(), 3);
    }

    #[test]
    fn test_short_result_not_padded() {
        let text = "1. only one";
        let items = parse_numbered_list(text, 3);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_malformed_input_yields_empty() {
        assert!(parse_numbered_list("no numbers here\njust prose", 3).is_empty());
        assert!(parse_numbered_list("", 3).is_empty());
    }

    #[test]
    fn test_missing_whitespace_after_marker_skipped() {
        // "1.Text" lacks the required whitespace after the marker
        assert!(parse_numbered_list("1.Text", 3).is_empty());
    }

    #[test]
    fn test_multi_digit_numbering() {
        let text = "10. tenth item";
        assert_eq!(parse_numbered_list(text, 1), vec!["tenth item"]);
    }

    #[test]
    fn test_parse_paired_list() {
        let text = "1. Support your wellness journey | A daily supplement for your routine.\n\
                    2. Your gut deserves better | Formulated for digestive comfort.";
        let hooks = parse_paired_list(text, 5);
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[0].main, "Support your wellness journey");
        assert_eq!(hooks[0].supporting, "A daily supplement for your routine.");
    }

    #[test]
    fn test_paired_line_without_delimiter_gets_fallback() {
        let hooks = parse_paired_list("1. Just a headline", 5);
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].main, "Just a headline");
        assert_eq!(hooks[0].supporting, GENERIC_SUPPORTING);
    }

    #[test]
    fn test_paired_list_strips_formatting() {
        let hooks = parse_paired_list("1. **Bold hook** | \"Quoted support\"", 5);
        assert_eq!(hooks[0].main, "Bold hook");
        assert_eq!(hooks[0].supporting, "Quoted support");
    }

    #[test]
    fn test_paired_list_truncates() {
        let text = (1..=8)
            .map(|i| format!("{}. hook {} | support {}", i, i, i))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_paired_list(&text, 5).len(), 5);
    }

    #[test]
    fn test_indented_lines_accepted() {
        let items = parse_numbered_list("  1. indented", 1);
        assert_eq!(items, vec!["indented"]);
    }

    #[test]
    fn test_free_form_returns_whole_text() {
        let text = "A bottle dissolving into golden light above a calm kitchen counter.";
        let items = parse_free_form(text, 50);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0], text);
    }

    #[test]
    fn test_free_form_strips_leading_marker() {
        let items = parse_free_form("1. A single-line image prompt with plenty of descriptive detail.", 50);
        assert_eq!(items.len(), 1);
        assert!(!items[0].starts_with("1."));
    }

    #[test]
    fn test_free_form_too_short_is_shortfall() {
        assert!(parse_free_form("too short", 50).is_empty());
        assert!(parse_free_form("", 50).is_empty());
    }
}
