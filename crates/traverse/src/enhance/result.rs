//! Default result enhancers.
//!
//! The stages run in this order:
//! label normalization → status validation → structured content detection →
//! text extraction → meta-refresh following → caller content enhancers.
//! Status has to be known before the content type is trusted, text has to be
//! decoded before it can be scanned for a refresh tag, and caller stages see
//! the most refined classification available.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::core::{
    content_disposition, content_length, content_type, is_html, is_structured, is_text,
    meta_refresh_target, normalize_label,
};
use crate::data::{
    ContentDetail, ContentRedirect, InvalidHttpStatus, TextContent, TraversalContent, TraversalKind,
    TraversalResult, TraverseContext,
};
use crate::enhance::chain::{ResultChain, ResultEnhancer};
use crate::traverse::traverse;

/// Collapses line breaks in the result label.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeLabel;

#[async_trait]
impl ResultEnhancer for NormalizeLabel {
    fn name(&self) -> &'static str { "normalize_label" }

    async fn enhance(&self, _ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let normalized = match result.label.as_deref().map(normalize_label) {
            Some(Cow::Owned(label)) => Some(label),
            _ => None,
        };
        match normalized {
            Some(label) => result.relabel(label, Some("label normalized")),
            None => result,
        }
    }
}

/// Classifies an unclassified response as content (status 200) or as an
/// invalid status (anything else).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateStatus;

#[async_trait]
impl ResultEnhancer for ValidateStatus {
    fn name(&self) -> &'static str { "validate_status" }

    async fn enhance(&self, _ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let TraversalKind::Successful(ok) = &result.kind else {
            return result;
        };

        let response = &ok.response;
        if response.status != 200 {
            let kind = TraversalKind::InvalidHttpStatus(InvalidHttpStatus {
                response:            response.clone(),
                terminal_url:        ok.terminal_url.clone(),
                invalid_http_status: response.status,
            });
            return result.transform(kind, Some("invalid HTTP status"));
        }

        let kind = TraversalKind::Content(TraversalContent {
            response:            response.clone(),
            terminal_url:        ok.terminal_url.clone(),
            http_status:         response.status,
            content_type:        content_type(&response.headers),
            content_disposition: content_disposition(&response.headers),
            content_length:      content_length(&response.headers),
            detail:              ContentDetail::Bytes,
        });
        result.transform(kind, Some("valid HTTP status"))
    }
}

/// Marks JSON and XML content as structured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectStructuredContent;

#[async_trait]
impl ResultEnhancer for DetectStructuredContent {
    fn name(&self) -> &'static str { "detect_structured_content" }

    async fn enhance(&self, _ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let TraversalKind::Content(content) = &result.kind else {
            return result;
        };
        if content.detail != ContentDetail::Bytes || !is_structured(&content.content_type) {
            return result;
        }

        let kind = TraversalKind::Content(content.with_detail(ContentDetail::Structured));
        result.transform(kind, Some("structured content"))
    }
}

/// Decodes `text/*` bodies. A body that cannot be read turns the result
/// unsuccessful.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractText;

#[async_trait]
impl ResultEnhancer for ExtractText {
    fn name(&self) -> &'static str { "extract_text" }

    async fn enhance(&self, _ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let TraversalKind::Content(content) = &result.kind else {
            return result;
        };
        if content.detail != ContentDetail::Bytes || !is_text(&content.content_type) {
            return result;
        }

        let kind = match content.response.body.bytes().await {
            Ok(raw) => TraversalKind::Content(content.with_detail(ContentDetail::Text(TextContent::decode(
                raw,
                is_html(&content.content_type),
            )))),
            Err(error) => TraversalKind::Unsuccessful {
                error: Arc::new(error),
            },
        };
        result.transform(kind, Some("text extracted"))
    }
}

/// Follows `<meta content="0;url=...">` refreshes in HTML content by
/// traversing the target as a child of the current context.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowMetaRefresh;

fn resolve(base: &str, target: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(target))
        .map(String::from)
        .unwrap_or_else(|_| target.to_string())
}

#[async_trait]
impl ResultEnhancer for FollowMetaRefresh {
    fn name(&self) -> &'static str { "follow_meta_refresh" }

    async fn enhance(&self, ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let TraversalKind::Content(content) = &result.kind else {
            return result;
        };
        let target = content
            .text()
            .filter(|text| text.is_html_content)
            .and_then(|text| meta_refresh_target(&text.body_text))
            .map(str::to_string);
        let Some(target) = target else {
            return result;
        };

        let resolved = resolve(&content.terminal_url, &target);
        debug!(from = %content.terminal_url, to = %resolved, "following meta refresh");
        let nested = traverse(ctx.redirect_to(resolved)).await;

        let kind = TraversalKind::ContentRedirect(ContentRedirect {
            content:              content.clone(),
            content_redirect_url: target,
            result:               Box::new(nested),
        });
        result.transform(kind, Some("meta refresh"))
    }
}

/// Runs caller-supplied stages on content results.
///
/// Redirect results are skipped: their nested traversal already ran the same
/// stages on the final content.
#[derive(Clone, Default)]
pub struct ContentEnhancers {
    chain: ResultChain,
}

impl ContentEnhancers {
    pub fn new(chain: ResultChain) -> Self { Self { chain } }
}

#[async_trait]
impl ResultEnhancer for ContentEnhancers {
    fn name(&self) -> &'static str { "content_enhancers" }

    async fn enhance(&self, ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        if matches!(
            result.kind,
            TraversalKind::Content(_) | TraversalKind::Json(_) | TraversalKind::Download(_)
        ) {
            self.chain.enhance(ctx, result).await
        } else {
            result
        }
    }
}

/// The standard result pipeline with `content` as its last stage.
pub fn default_result_chain(content: ResultChain) -> ResultChain {
    ResultChain::new()
        .then(NormalizeLabel)
        .then(ValidateStatus)
        .then(DetectStructuredContent)
        .then(ExtractText)
        .then(FollowMetaRefresh)
        .then(ContentEnhancers::new(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Successful, TraverseOptions};
    use crate::effects::{HttpResponse, MockTransport, ResponseBody};
    use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
    use http::{HeaderMap, HeaderValue};

    fn ctx() -> TraverseContext {
        TraverseContext::new("https://example.com/", TraverseOptions::new(MockTransport::new()))
    }

    fn successful(status: u16, content_type: Option<&'static str>, body: &'static str) -> TraversalResult {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        TraversalResult::new(
            "https://example.com/".into(),
            None,
            None,
            TraversalKind::Successful(Successful {
                response:     HttpResponse {
                    status,
                    url: "https://example.com/".to_string(),
                    headers,
                    body: ResponseBody::from_bytes(body),
                },
                terminal_url: "https://example.com/".to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn label_is_only_rewritten_when_it_changes() {
        let mut result = successful(200, None, "");
        result.label = Some("clean".to_string());
        let result = NormalizeLabel.enhance(&ctx(), result).await;
        assert!(result.provenance.is_none());

        let mut result = successful(200, None, "");
        result.label = Some(" two\nlines ".to_string());
        let result = NormalizeLabel.enhance(&ctx(), result).await;
        assert_eq!(result.label.as_deref(), Some("two lines"));
        assert_eq!(result.position(), Some(0));
    }

    #[tokio::test]
    async fn status_200_becomes_content() {
        let result = ValidateStatus.enhance(&ctx(), successful(200, Some("text/plain "), "abc")).await;
        let content = result.as_content().expect("content");
        assert_eq!(content.http_status, 200);
        assert_eq!(content.content_type, "text/plain");
        assert_eq!(content.content_length, Some(3));
        assert_eq!(content.detail, ContentDetail::Bytes);
    }

    #[tokio::test]
    async fn other_statuses_are_invalid() {
        let result = ValidateStatus.enhance(&ctx(), successful(404, Some("text/html"), "")).await;
        assert!(result.is_invalid_http_status());
        assert!(!result.is_content());

        let again = ValidateStatus.enhance(&ctx(), result).await;
        assert_eq!(again.position(), Some(0));
    }

    #[tokio::test]
    async fn missing_content_type_is_empty() {
        let result = ValidateStatus.enhance(&ctx(), successful(200, None, "x")).await;
        assert_eq!(result.as_content().map(|c| c.content_type.as_str()), Some(""));
    }

    #[tokio::test]
    async fn json_is_structured_and_left_unread() {
        let ctx = ctx();
        let result = ValidateStatus.enhance(&ctx, successful(200, Some("application/json"), "{}")).await;
        let result = DetectStructuredContent.enhance(&ctx, result).await;
        let result = ExtractText.enhance(&ctx, result).await;

        assert!(result.is_structured_content());
        assert!(result.as_text().is_none());
        assert!(result.response().is_some_and(|r| r.body.is_pending()));
    }

    #[tokio::test]
    async fn text_extraction_is_idempotent() {
        let ctx = ctx();
        let result = ValidateStatus.enhance(&ctx, successful(200, Some("text/html"), "<p>x</p>")).await;
        let result = ExtractText.enhance(&ctx, result).await;
        let position = result.position();
        let result = ExtractText.enhance(&ctx, result).await;

        assert_eq!(result.position(), position);
        assert!(result.is_html_content());
        assert_eq!(result.as_text().map(|t| t.body_text.as_str()), Some("<p>x</p>"));
    }

    #[tokio::test]
    async fn html_without_refresh_is_not_redirected() {
        let ctx = ctx();
        let result = ValidateStatus.enhance(&ctx, successful(200, Some("text/html"), "<p>x</p>")).await;
        let result = ExtractText.enhance(&ctx, result).await;
        let result = FollowMetaRefresh.enhance(&ctx, result).await;

        assert!(result.as_redirect().is_none());
        assert!(result.as_text().is_some());
    }

    #[test]
    fn relative_refresh_targets_resolve_against_terminal_url() {
        assert_eq!(resolve("https://example.com/a/b", "c"), "https://example.com/a/c");
        assert_eq!(resolve("https://example.com/a/b", "https://other.test/"), "https://other.test/");
        assert_eq!(resolve("not a url", "X"), "X");
    }
}
