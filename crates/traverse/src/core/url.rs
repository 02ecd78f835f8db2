use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static TRACKING_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^utm_[^=&]*=").expect("tracking parameter pattern is valid"));

/// Remove `utm_*` key-value pairs from the query string of `url`.
///
/// Other parameters keep their order and the fragment is preserved. When no
/// parameter is left the `?` is dropped as well.
///
/// # Examples
///
/// ```
/// use traverse::core::strip_tracking_params;
///
/// assert_eq!(
///     strip_tracking_params("https://example.com/p?id=7&utm_source=mail#top"),
///     "https://example.com/p?id=7#top"
/// );
/// ```
pub fn strip_tracking_params(url: &str) -> Cow<'_, str> {
    let Some(start) = url.find('?') else {
        return Cow::Borrowed(url);
    };
    let (base, rest) = url.split_at(start);
    let rest = &rest[1..];
    let (query, fragment) = match rest.find('#') {
        Some(hash) => rest.split_at(hash),
        None => (rest, ""),
    };

    if !query.split('&').any(|pair| TRACKING_PARAM.is_match(pair)) {
        return Cow::Borrowed(url);
    }

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !TRACKING_PARAM.is_match(pair))
        .collect();

    let mut stripped = String::with_capacity(url.len());
    stripped.push_str(base);
    if !kept.is_empty() {
        stripped.push('?');
        stripped.push_str(&kept.join("&"));
    }
    stripped.push_str(fragment);
    Cow::Owned(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_and_trailing_tracking_pairs() {
        assert_eq!(
            strip_tracking_params("https://example.com/?utm_source=x&a=1&utm_medium=y"),
            "https://example.com/?a=1"
        );
        assert_eq!(
            strip_tracking_params("https://example.com/?utm_campaign=spring"),
            "https://example.com/"
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(strip_tracking_params("http://x.test/?UTM_Source=a&b=2"), "http://x.test/?b=2");
    }

    #[test]
    fn untouched_urls_are_borrowed() {
        let url = "https://example.com/path?utmost=1&q=utm_source=x";
        assert!(matches!(strip_tracking_params(url), Cow::Borrowed(_)));
        assert!(matches!(strip_tracking_params("https://example.com/"), Cow::Borrowed(_)));
    }

    #[test]
    fn keeps_fragment() {
        assert_eq!(
            strip_tracking_params("https://example.com/a?utm_term=t#section-2"),
            "https://example.com/a#section-2"
        );
    }
}
