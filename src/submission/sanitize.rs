use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WS_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\n]+").unwrap());
static SPACE_TAB_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Single-line sanitizer: drop markup and control characters, collapse
/// whitespace runs to one space, trim.
pub fn text(input: &str) -> String {
    let stripped = TAG_RE.replace_all(input, "");
    let collapsed = WS_RUN_RE.replace_all(&stripped, " ");
    collapsed
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Multi-line sanitizer: like [`text`] but line breaks survive. Used
/// for the message body, where formatting is the submitter's.
pub fn textarea(input: &str) -> String {
    let stripped = TAG_RE.replace_all(input, "");
    let unixed = stripped.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned: String = unixed
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    SPACE_TAB_RUN_RE
        .replace_all(&cleaned, " ")
        .trim()
        .to_string()
}
