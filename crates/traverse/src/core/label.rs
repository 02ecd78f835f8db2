use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n]+").expect("line break pattern is valid"));

/// Collapse embedded line breaks into single spaces and trim the result.
pub fn normalize_label(label: &str) -> Cow<'_, str> {
    match LINE_BREAKS.replace_all(label, " ") {
        Cow::Borrowed(unchanged) => {
            let trimmed = unchanged.trim();
            if trimmed.len() == unchanged.len() {
                Cow::Borrowed(label)
            } else {
                Cow::Owned(trimmed.to_string())
            }
        }
        Cow::Owned(replaced) => Cow::Owned(replaced.trim().to_string()),
    }
}
