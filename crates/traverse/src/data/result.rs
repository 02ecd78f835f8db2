//! The traversal result lattice.
//!
//! A [`TraversalResult`] carries the request it answers plus a
//! [`TraversalKind`] saying how far classification got. Kinds refine each
//! other monotonically:
//!
//! ```text
//! Unsuccessful
//! Successful ── InvalidHttpStatus
//!            └─ Content (bytes | structured | text) ── ContentRedirect
//!                                                    ├─ Json
//!                                                    └─ Download
//! ```
//!
//! The capability accessors (`as_content`, `as_text`, ...) answer for every
//! kind that includes the capability, so a text result is also content.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::core::ContentDisposition;
use crate::data::request::{RequestOptions, RequestTarget};
use crate::download::DownloadOutcome;
use crate::effects::{ByteSink, HttpResponse};
use crate::error::{Result, TraverseError};

/// The transport returned a response that has not been classified yet.
#[derive(Debug, Clone)]
pub struct Successful {
    pub response:     HttpResponse,
    pub terminal_url: String,
}

/// Any status other than 200. A terminal classification, not an error.
#[derive(Debug, Clone)]
pub struct InvalidHttpStatus {
    pub response:            HttpResponse,
    pub terminal_url:        String,
    pub invalid_http_status: u16,
}

/// A decoded `text/*` body together with the bytes it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    /// Body exactly as received.
    pub raw:             Bytes,
    /// `raw` decoded as UTF-8, invalid sequences replaced.
    pub body_text:       String,
    pub is_html_content: bool,
}

impl TextContent {
    pub fn decode(raw: Bytes, is_html_content: bool) -> Self {
        let body_text = String::from_utf8_lossy(&raw).into_owned();
        Self {
            raw,
            body_text,
            is_html_content,
        }
    }
}

/// What is known about the body of a 200 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDetail {
    /// Opaque bytes, still unread.
    Bytes,
    /// Machine-structured payload (JSON, XML), still unread.
    Structured,
    /// `text/*` payload, already decoded.
    Text(TextContent),
}

/// A status 200 response.
#[derive(Debug, Clone)]
pub struct TraversalContent {
    pub response:            HttpResponse,
    pub terminal_url:        String,
    pub http_status:         u16,
    pub content_type:        String,
    pub content_disposition: Option<ContentDisposition>,
    /// Declared `Content-Length`, if any.
    pub content_length:      Option<u64>,
    pub detail:              ContentDetail,
}

impl TraversalContent {
    pub fn with_detail(&self, detail: ContentDetail) -> Self {
        Self {
            detail,
            ..self.clone()
        }
    }

    pub fn text(&self) -> Option<&TextContent> {
        match &self.detail {
            ContentDetail::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_structured_content(&self) -> bool { matches!(self.detail, ContentDetail::Structured) }

    pub fn is_html_content(&self) -> bool { self.text().is_some_and(|text| text.is_html_content) }

    /// Declared length, falling back to the received body size when the
    /// body was already read into memory.
    pub fn expected_size(&self) -> Option<u64> {
        self.content_length
            .or_else(|| self.text().map(|text| text.raw.len() as u64))
    }

    /// Read the whole payload. Text bodies are served from the bytes kept in
    /// memory, anything else consumes the response body.
    pub async fn read_bytes(&self) -> Result<Bytes> {
        match &self.detail {
            ContentDetail::Text(text) => Ok(text.raw.clone()),
            _ => self.response.body.bytes().await,
        }
    }

    /// Write the payload into `sink` and return the number of bytes the sink
    /// accepted.
    pub async fn write_content(&self, sink: &mut (dyn ByteSink + '_)) -> Result<u64> {
        match &self.detail {
            ContentDetail::Text(text) => {
                let written = sink.write(&text.raw).await?;
                sink.finish().await?;
                Ok(written as u64)
            }
            _ => self.response.body.write_to(sink).await,
        }
    }
}

/// HTML content whose meta-refresh pointed elsewhere.
#[derive(Debug, Clone)]
pub struct ContentRedirect {
    /// The page carrying the refresh tag.
    pub content:              TraversalContent,
    /// Target exactly as written in the page.
    pub content_redirect_url: String,
    /// Outcome of traversing the target.
    pub result:               Box<TraversalResult>,
}

#[derive(Debug, Clone)]
pub struct JsonContent {
    pub content: TraversalContent,
    pub value:   Value,
}

#[derive(Debug, Clone)]
pub struct DownloadedContent {
    pub content: TraversalContent,
    pub outcome: DownloadOutcome,
}

#[derive(Debug, Clone)]
pub enum TraversalKind {
    Unsuccessful { error: Arc<TraverseError> },
    Successful(Successful),
    InvalidHttpStatus(InvalidHttpStatus),
    Content(TraversalContent),
    ContentRedirect(ContentRedirect),
    Json(JsonContent),
    Download(DownloadedContent),
}

impl TraversalKind {
    pub fn name(&self) -> &'static str {
        match self {
            TraversalKind::Unsuccessful { .. } => "unsuccessful",
            TraversalKind::Successful(_) => "successful",
            TraversalKind::InvalidHttpStatus(_) => "invalid_http_status",
            TraversalKind::Content(_) => "content",
            TraversalKind::ContentRedirect(_) => "content_redirect",
            TraversalKind::Json(_) => "json",
            TraversalKind::Download(_) => "download",
        }
    }
}

/// Link from a result to the result it was derived from.
#[derive(Debug, Clone)]
pub struct Provenance {
    pub transformed_from: Box<TraversalResult>,
    /// 0 for the first transformation, then one more per step.
    pub position:         usize,
    pub remarks:          Option<String>,
}

#[derive(Debug, Clone)]
pub struct TraversalResult {
    pub request:         RequestTarget,
    pub request_options: Option<RequestOptions>,
    pub label:           Option<String>,
    pub kind:            TraversalKind,
    pub provenance:      Option<Provenance>,
}

impl TraversalResult {
    pub fn new(
        request: RequestTarget,
        request_options: Option<RequestOptions>,
        label: Option<String>,
        kind: TraversalKind,
    ) -> Self {
        Self {
            request,
            request_options,
            label,
            kind,
            provenance: None,
        }
    }

    /// Derive a new result of `kind`, keeping `self` as its predecessor.
    pub fn transform(self, kind: TraversalKind, remarks: Option<&str>) -> Self {
        Self::derive(self, None, kind, remarks)
    }

    /// Derive a new result with a different label and the same kind.
    pub fn relabel(self, label: String, remarks: Option<&str>) -> Self {
        let kind = self.kind.clone();
        Self::derive(self, Some(label), kind, remarks)
    }

    fn derive(
        previous: Self,
        label: Option<String>,
        kind: TraversalKind,
        remarks: Option<&str>,
    ) -> Self {
        let position = previous.provenance.as_ref().map_or(0, |p| p.position + 1);
        Self {
            request: previous.request.clone(),
            request_options: previous.request_options.clone(),
            label: label.or_else(|| previous.label.clone()),
            kind,
            provenance: Some(Provenance {
                transformed_from: Box::new(previous),
                position,
                remarks: remarks.map(str::to_string),
            }),
        }
    }

    pub fn position(&self) -> Option<usize> { self.provenance.as_ref().map(|p| p.position) }

    pub fn transformed_from(&self) -> Option<&TraversalResult> {
        self.provenance.as_ref().map(|p| p.transformed_from.as_ref())
    }

    /// This result followed by every predecessor, newest first.
    pub fn history(&self) -> impl Iterator<Item = &TraversalResult> {
        std::iter::successors(Some(self), |result| result.transformed_from())
    }

    /// The result of the last redirect hop, or `self` when there was none.
    pub fn final_result(&self) -> &TraversalResult {
        let mut current = self;
        while let TraversalKind::ContentRedirect(redirect) = &current.kind {
            current = redirect.result.as_ref();
        }
        current
    }

    pub fn is_unsuccessful(&self) -> bool { matches!(self.kind, TraversalKind::Unsuccessful { .. }) }

    /// `true` for every kind that got a response from the transport.
    pub fn is_successful(&self) -> bool { !self.is_unsuccessful() }

    pub fn is_invalid_http_status(&self) -> bool {
        matches!(self.kind, TraversalKind::InvalidHttpStatus(_))
    }

    pub fn error(&self) -> Option<&TraverseError> {
        match &self.kind {
            TraversalKind::Unsuccessful { error } => Some(error.as_ref()),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match &self.kind {
            TraversalKind::Unsuccessful { .. } => None,
            TraversalKind::Successful(ok) => Some(&ok.response),
            TraversalKind::InvalidHttpStatus(invalid) => Some(&invalid.response),
            _ => self.as_content().map(|content| &content.response),
        }
    }

    pub fn terminal_url(&self) -> Option<&str> {
        match &self.kind {
            TraversalKind::Unsuccessful { .. } => None,
            TraversalKind::Successful(ok) => Some(&ok.terminal_url),
            TraversalKind::InvalidHttpStatus(invalid) => Some(&invalid.terminal_url),
            _ => self.as_content().map(|content| content.terminal_url.as_str()),
        }
    }

    pub fn as_content(&self) -> Option<&TraversalContent> {
        match &self.kind {
            TraversalKind::Content(content) => Some(content),
            TraversalKind::ContentRedirect(redirect) => Some(&redirect.content),
            TraversalKind::Json(json) => Some(&json.content),
            TraversalKind::Download(download) => Some(&download.content),
            TraversalKind::Unsuccessful { .. }
            | TraversalKind::Successful(_)
            | TraversalKind::InvalidHttpStatus(_) => None,
        }
    }

    pub fn is_content(&self) -> bool { self.as_content().is_some() }

    pub fn is_structured_content(&self) -> bool {
        self.as_content().is_some_and(TraversalContent::is_structured_content)
    }

    pub fn as_text(&self) -> Option<&TextContent> { self.as_content().and_then(TraversalContent::text) }

    pub fn is_html_content(&self) -> bool { self.as_text().is_some_and(|text| text.is_html_content) }

    pub fn as_redirect(&self) -> Option<&ContentRedirect> {
        match &self.kind {
            TraversalKind::ContentRedirect(redirect) => Some(redirect),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonContent> {
        match &self.kind {
            TraversalKind::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn as_download(&self) -> Option<&DownloadedContent> {
        match &self.kind {
            TraversalKind::Download(download) => Some(download),
            _ => None,
        }
    }
}
