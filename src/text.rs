//! Plain-text cleanup for model output.
//!
//! Models answer in markdown even when asked not to. `clean_text_formatting`
//! strips that markup so summaries and chat replies render as plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_STARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Failed to create cleanup regex"));
static BOLD_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.*?)__").expect("Failed to create cleanup regex"));
static ITALIC_STAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("Failed to create cleanup regex"));
static ITALIC_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(.*?)_").expect("Failed to create cleanup regex"));
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("Failed to create cleanup regex"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`(.*?)`").expect("Failed to create cleanup regex"));
static DOUBLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("Failed to create cleanup regex"));
static SINGLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'([^']*)'").expect("Failed to create cleanup regex"));
static ESCAPED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\\+([*_`"'])"#).expect("Failed to create cleanup regex"));
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\n(\d+)[.:]?[ \t]*").expect("Failed to create cleanup regex"));
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to create cleanup regex"));
static TRAILING_BLANKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+\n").expect("Failed to create cleanup regex"));
static BLANK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s+\n").expect("Failed to create cleanup regex"));
static SPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("Failed to create cleanup regex"));
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([.,:;!?])").expect("Failed to create cleanup regex"));
static SPACE_AFTER_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,:;!?])\s{2,}").expect("Failed to create cleanup regex"));

/// Remove markdown and escape artifacts from model output.
///
/// Idempotent: the substitution pass repeats until the text stops changing.
/// A pass that changes the text either deletes characters or normalizes a
/// list marker, so the number of changing passes is bounded by the input
/// length.
pub fn clean_text_formatting(text: &str) -> String {
    let limit = text.chars().count() + 2;
    let mut current = clean_once(text);
    for _ in 0..limit {
        let next = clean_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn clean_once(text: &str) -> String {
    // Literal escape sequences
    let text = text
        .replace("\\n", "\n")
        .replace("\\t", " ")
        .replace("\\r", "");

    let text = BOLD_STARS.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORES.replace_all(&text, "$1");
    let text = ITALIC_STAR.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1");

    let text = CODE_FENCE.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");

    let text = DOUBLE_QUOTED.replace_all(&text, "$1");
    let text = SINGLE_QUOTED.replace_all(&text, "$1");

    let text = ESCAPED_MARKER.replace_all(&text, "$1");

    let text = LIST_MARKER.replace_all(&text, "\n\n${1}. ");

    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = TRAILING_BLANKS.replace_all(&text, "\n");
    let text = BLANK_LINE.replace_all(&text, "\n\n");
    let text = SPACE_RUN.replace_all(&text, " ");

    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = SPACE_AFTER_PUNCT.replace_all(&text, "$1 ");

    text.trim().to_string()
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
