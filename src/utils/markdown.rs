//! Telegram MarkdownV2 helpers

use once_cell::sync::Lazy;
use regex::Regex;

/// Every character the Bot API requires to be escaped in MarkdownV2 text.
static SPECIAL_CHARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([_*\[\]()~`>#+\-=|{}.!\\])").expect("static regex compile")
});

/// Escape `text` for literal display inside a MarkdownV2 message.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    SPECIAL_CHARS_RE.replace_all(text, r"\$1").into_owned()
}

/// Wrap already-escaped text in bold markers.
#[must_use]
pub fn bold(escaped: &str) -> String {
    format!("*{escaped}*")
}
