use once_cell::sync::Lazy;
use regex::Regex;

static META_REFRESH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\b[^>]*\bcontent\s*=\s*["']\s*0\s*;\s*url\s*=\s*([^"'>]+)["']"#)
        .expect("meta refresh pattern is valid")
});

/// Target of an immediate `<meta ... content="0;url=TARGET">` refresh, if
/// the document contains one.
pub fn meta_refresh_target(html: &str) -> Option<&str> {
    META_REFRESH
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|target| target.as_str().trim())
        .filter(|target| !target.is_empty())
}
