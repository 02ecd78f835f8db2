//! Typed JSON fetching: each failing call reports through exactly one
//! callback.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use traverse::{JsonOptions, MockResponse, MockTransport, TraverseError, TraverseOptions, safe_fetch_json};

#[derive(Debug, Deserialize, PartialEq)]
struct Release {
    name:    String,
    version: u32,
}

fn is_release(value: &serde_json::Value) -> bool {
    value.get("name").is_some_and(|name| name.is_string())
}

fn options() -> TraverseOptions {
    TraverseOptions::new(
        MockTransport::new()
            .respond("https://api.test/missing", MockResponse::status(404))
            .respond("https://api.test/wrong", MockResponse::json(r#"{"title": "nope"}"#))
            .respond("https://api.test/typo", MockResponse::json(r#"{"name": "a", "version": "x"}"#))
            .respond("https://api.test/broken", MockResponse::json("{\"name\":"))
            .respond("https://api.test/release", MockResponse::json(r#"{"name": "core", "version": 3}"#))
            .respond(
                "https://api.test/moved",
                MockResponse::html(r#"<meta http-equiv="refresh" content="0; url=/release">"#),
            ),
    )
}

struct Counts {
    invalid: usize,
    guard:   Arc<AtomicUsize>,
}

async fn fetch(url: &str) -> (Option<Release>, Counts) {
    let guard = Arc::new(AtomicUsize::new(0));
    let mut invalid = 0;

    let json_options = JsonOptions::new().guard(is_release).on_guard_failure({
        let guard = guard.clone();
        move |_| {
            guard.fetch_add(1, Ordering::SeqCst);
        }
    });
    let value = safe_fetch_json(&options(), url, json_options, |_| invalid += 1).await;

    (value, Counts { invalid, guard })
}

#[tokio::test]
async fn missing_resources_only_report_invalid_results() {
    let (value, counts) = fetch("https://api.test/missing").await;
    assert_eq!(value, None);
    assert_eq!(counts.invalid, 1);
    assert_eq!(counts.guard.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wrong_shapes_only_report_guard_failures() {
    for url in ["https://api.test/wrong", "https://api.test/typo"] {
        let (value, counts) = fetch(url).await;
        assert_eq!(value, None, "{url}");
        assert_eq!(counts.invalid, 0, "{url}");
        assert_eq!(counts.guard.load(Ordering::SeqCst), 1, "{url}");
    }
}

#[tokio::test]
async fn matching_shapes_are_returned() {
    let (value, counts) = fetch("https://api.test/release").await;
    assert_eq!(
        value,
        Some(Release {
            name:    "core".to_string(),
            version: 3,
        })
    );
    assert_eq!(counts.invalid, 0);
    assert_eq!(counts.guard.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_bodies_are_invalid_results() {
    let mut error = None;
    let value: Option<Release> = safe_fetch_json(
        &options(),
        "https://api.test/broken",
        JsonOptions::new().on_guard_failure(|_| panic!("no value was parsed")),
        |result| error = result.error().map(ToString::to_string),
    )
    .await;

    assert_eq!(value, None);
    assert!(error.is_some_and(|message| message.starts_with("invalid JSON content")));
}

#[tokio::test]
async fn redirects_are_followed_before_parsing() {
    let (value, counts) = fetch("https://api.test/moved").await;
    assert_eq!(value.map(|release| release.version), Some(3));
    assert_eq!(counts.invalid, 0);
}

#[tokio::test]
async fn unreachable_hosts_are_invalid_results() {
    let mut transport_failure = false;
    let value: Option<Release> = safe_fetch_json(
        &options(),
        "https://offline.test/",
        JsonOptions::new(),
        |result| transport_failure = result.error().is_some_and(TraverseError::is_transport),
    )
    .await;

    assert_eq!(value, None);
    assert!(transport_failure);
}
