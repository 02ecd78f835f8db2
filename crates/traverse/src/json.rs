//! Typed JSON fetching.
//!
//! [`safe_fetch_json`] separates two kinds of failure: never getting JSON at
//! all (network failure, non-200 status, unreadable or malformed body) and
//! getting JSON of the wrong shape. Each failing call reports through exactly
//! one of the two callbacks.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::data::{
    JsonContent, RequestOptions, RequestTarget, TraversalKind, TraversalResult, TraverseContext,
    TraverseOptions,
};
use crate::enhance::{ResultChain, ResultEnhancer};
use crate::error::TraverseError;
use crate::traverse::traverse;

/// Parses content bodies as JSON.
///
/// Text bodies are parsed from the bytes kept in memory; any other body is
/// consumed. A malformed body, including invalid UTF-8, turns the result
/// unsuccessful.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseJson;

#[async_trait]
impl ResultEnhancer for ParseJson {
    fn name(&self) -> &'static str { "parse_json" }

    async fn enhance(&self, _ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let TraversalKind::Content(content) = &result.kind else {
            return result;
        };

        let parsed = match content.read_bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).map_err(TraverseError::from),
            Err(error) => Err(error),
        };
        let kind = match parsed {
            Ok(value) => TraversalKind::Json(JsonContent {
                content: content.clone(),
                value,
            }),
            Err(error) => TraversalKind::Unsuccessful {
                error: Arc::new(error),
            },
        };
        result.transform(kind, Some("JSON parsed"))
    }
}

type Guard = Box<dyn Fn(&Value) -> bool + Send + Sync>;
type GuardFailure = Box<dyn FnOnce(&Value) + Send>;

/// Per-call settings for [`safe_fetch_json`].
pub struct JsonOptions<T> {
    pub request_options: Option<RequestOptions>,
    pub label:           Option<String>,
    guard:               Guard,
    on_guard_failure:    GuardFailure,
    target:              PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonOptions<T> {
    /// Accept any value that deserializes into `T`.
    pub fn new() -> Self {
        Self {
            request_options:  None,
            label:            None,
            guard:            Box::new(|_| true),
            on_guard_failure: Box::new(|_| {}),
            target:           PhantomData,
        }
    }

    /// Extra shape check applied before deserialization.
    pub fn guard(mut self, guard: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.guard = Box::new(guard);
        self
    }

    /// Called with the parsed value when it fails the guard or cannot be
    /// deserialized into `T`.
    pub fn on_guard_failure(mut self, callback: impl FnOnce(&Value) + Send + 'static) -> Self {
        self.on_guard_failure = Box::new(callback);
        self
    }

    pub fn request_options(mut self, options: RequestOptions) -> Self {
        self.request_options = Some(options);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn accept(self, value: &Value) -> Option<T> {
        if !(self.guard)(value) {
            debug!("JSON value rejected by guard");
            (self.on_guard_failure)(value);
            return None;
        }
        match serde_json::from_value::<T>(value.clone()) {
            Ok(typed) => Some(typed),
            Err(error) => {
                debug!(%error, "JSON value does not match target type");
                (self.on_guard_failure)(value);
                None
            }
        }
    }
}

impl<T: DeserializeOwned> Default for JsonOptions<T> {
    fn default() -> Self { Self::new() }
}

/// Fetch `request` and return its body as `T`.
///
/// `options` supplies the transport, request pipeline and hop limit; its
/// result pipeline is replaced by the default one ending in [`ParseJson`].
/// Meta-refresh redirects are followed and the last hop is inspected.
/// `on_invalid_result` receives that last hop when it carries no JSON.
pub async fn safe_fetch_json<T: DeserializeOwned>(
    options: &TraverseOptions,
    request: impl Into<RequestTarget>,
    json_options: JsonOptions<T>,
    on_invalid_result: impl FnOnce(&TraversalResult),
) -> Option<T> {
    let options = options
        .clone()
        .with_content_enhancers(ResultChain::new().then(ParseJson));

    let mut context = TraverseContext::new(request, options);
    context.request_options = json_options.request_options.clone();
    context.label = json_options.label.clone();

    let result = traverse(context).await;
    let last = result.final_result();
    match last.as_json() {
        Some(json) => json_options.accept(&json.value),
        None => {
            debug!(request = %last.request, kind = last.kind.name(), "no JSON content reached");
            on_invalid_result(last);
            None
        }
    }
}
