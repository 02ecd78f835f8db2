use std::collections::BTreeMap;

use http::HeaderMap;
use http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};

/// Parameters of a `Content-Disposition` header.
///
/// The header is split on `;`; every `key=value` segment is trimmed and a
/// value wrapped in `"` (or starting with `'`) loses its quotes. Segments
/// without `=`, such as the disposition type itself, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDisposition {
    params: BTreeMap<String, String>,
}

impl ContentDisposition {
    pub fn parse(value: &str) -> Self {
        let params = value
            .split(';')
            .filter_map(|segment| {
                let (key, value) = segment.split_once('=')?;
                Some((key.trim().to_string(), unquote(value.trim()).to_string()))
            })
            .collect();
        Self { params }
    }

    /// Look up a parameter, ignoring ASCII case of the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn filename(&self) -> Option<&str> { self.get("filename") }

    pub fn params(&self) -> &BTreeMap<String, String> { &self.params }

    pub fn is_empty(&self) -> bool { self.params.is_empty() }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else if let Some(rest) = value.strip_prefix('\'') {
        rest.strip_suffix('\'').unwrap_or(rest)
    } else {
        value
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: http::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Trimmed `Content-Type`, or `""` when the header is absent.
pub fn content_type(headers: &HeaderMap) -> String {
    header_str(headers, CONTENT_TYPE).map(str::trim).unwrap_or_default().to_string()
}

pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, CONTENT_LENGTH).and_then(|value| value.trim().parse().ok())
}

pub fn content_disposition(headers: &HeaderMap) -> Option<ContentDisposition> {
    header_str(headers, CONTENT_DISPOSITION).map(ContentDisposition::parse)
}

fn mime_essence(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

pub fn is_text(content_type: &str) -> bool { mime_essence(content_type).starts_with("text/") }

pub fn is_html(content_type: &str) -> bool { mime_essence(content_type) == "text/html" }

/// JSON and XML media types, including `+json`/`+xml` suffixes.
pub fn is_structured(content_type: &str) -> bool {
    let essence = mime_essence(content_type);
    matches!(essence.as_str(), "application/json" | "application/xml" | "text/xml")
        || essence.ends_with("+json")
        || essence.ends_with("+xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn disposition_with_quoted_filename() {
        let parsed = ContentDisposition::parse(r#"attachment; filename="a b.pdf""#);
        assert_eq!(parsed.filename(), Some("a b.pdf"));
        assert_eq!(parsed.params().len(), 1);
    }

    #[test]
    fn disposition_with_bare_filename() {
        let parsed = ContentDisposition::parse("inline; filename=plain.txt");
        assert_eq!(parsed.filename(), Some("plain.txt"));
        assert_eq!(parsed.params().len(), 1);
    }

    #[test]
    fn disposition_single_quotes_and_case() {
        let parsed = ContentDisposition::parse("attachment; FileName='report.csv'; size=42");
        assert_eq!(parsed.filename(), Some("report.csv"));
        assert_eq!(parsed.get("size"), Some("42"));
        assert!(ContentDisposition::parse("inline").is_empty());
    }

    #[test]
    fn content_type_is_trimmed_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_type(&headers), "");

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("  text/html; charset=utf-8 "));
        assert_eq!(content_type(&headers), "text/html; charset=utf-8");
    }

    #[test]
    fn content_length_parses_digits_only() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1024"));
        assert_eq!(content_length(&headers), Some(1024));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert_eq!(content_length(&headers), None);
    }

    #[test]
    fn media_type_classification() {
        assert!(is_text("text/plain"));
        assert!(is_html("TEXT/HTML; charset=utf-8"));
        assert!(!is_html("text/plain"));
        assert!(is_structured("application/json"));
        assert!(is_structured("application/problem+json; charset=utf-8"));
        assert!(is_structured("text/xml"));
        assert!(!is_structured("text/plain"));
        assert!(!is_text(""));
    }
}
