//! Text preparation applied before a round is dispatched.

use std::sync::LazyLock;

use regex::Regex;

/// Built-in system instruction used when no override layer is set.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are an expert editor specializing in improving clarity, readability, and flow of academic texts. Your task is to revise the provided text while maintaining the author's voice and meaning. Focus on:
- Improving sentence structure and flow
- Enhancing clarity and readability
- Fixing grammatical errors
- Maintaining academic tone
- Preserving all citations and references
Return only the revised text without any explanations or comments.";

/// Placeholder replaced by the user's text in a message template.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Default user message template.
pub const DEFAULT_USER_TEMPLATE: &str =
    "Please revise the following text for clarity and readability:\n\n{text}";

// [12], [iv]
static BRACKET_FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:\d+|[ivx]+)\]").expect("Invalid regex")
});

// (3), (ii)
static PAREN_FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((?:\d+|[ivx]+)\)").expect("Invalid regex")
});

static HORIZONTAL_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("Invalid regex"));

/// Removes footnote markers such as `[12]`, `[iv]`, `(3)` and `(ii)`.
///
/// Runs of spaces and tabs left behind collapse to one space and the result
/// is trimmed. Newlines are preserved.
pub fn remove_footnotes(text: &str) -> String {
    let text = BRACKET_FOOTNOTE_RE.replace_all(text, "");
    let text = PAREN_FOOTNOTE_RE.replace_all(&text, "");
    let text = HORIZONTAL_SPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Converts CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Substitutes `text` into a user message template.
///
/// A template without the placeholder gets the text appended after a blank
/// line, so the text is never dropped.
pub fn render_user_message(template: &str, text: &str) -> String {
    if template.contains(TEXT_PLACEHOLDER) {
        template.replace(TEXT_PLACEHOLDER, text)
    } else if template.trim().is_empty() {
        text.to_string()
    } else {
        format!("{template}\n\n{text}")
    }
}

/// Normalizes line endings and optionally strips footnotes.
pub fn prepare_input(text: &str, strip_footnotes: bool) -> String {
    let text = normalize_line_endings(text);
    if strip_footnotes {
        remove_footnotes(&text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_footnotes_brackets_and_parens() {
        let text = "Prior work[1] shows this[iv]. Others (2) disagree (ii).";
        assert_eq!(
            remove_footnotes(text),
            "Prior work shows this. Others disagree ."
        );
    }

    #[test]
    fn test_remove_footnotes_case_insensitive() {
        assert_eq!(remove_footnotes("See [IV] and (XI)."), "See and .");
    }

    #[test]
    fn test_remove_footnotes_keeps_words_in_parens() {
        assert_eq!(
            remove_footnotes("A (very) clear [sic] point."),
            "A (very) clear [sic] point."
        );
    }

    #[test]
    fn test_remove_footnotes_preserves_newlines() {
        assert_eq!(remove_footnotes("One[1]\n\nTwo  (2)\t\tthree"), "One\n\nTwo three");
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_render_user_message() {
        assert_eq!(
            render_user_message(DEFAULT_USER_TEMPLATE, "Hello."),
            "Please revise the following text for clarity and readability:\n\nHello."
        );
        assert_eq!(render_user_message("Edit:", "Hello."), "Edit:\n\nHello.");
        assert_eq!(render_user_message("", "Hello."), "Hello.");
    }

    #[test]
    fn test_prepare_input() {
        assert_eq!(prepare_input("A[1]\r\nB", true), "A\nB");
        assert_eq!(prepare_input("A[1]\r\nB", false), "A[1]\nB");
    }
}
