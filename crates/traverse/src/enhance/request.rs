use std::borrow::Cow;

use crate::core::strip_tracking_params;
use crate::data::{RequestTarget, TraverseContext};
use crate::enhance::chain::{RequestChain, RequestEnhancer};

/// Drops `utm_*` query parameters from textual request targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripTrackingParams;

impl RequestEnhancer for StripTrackingParams {
    fn name(&self) -> &'static str { "strip_tracking_params" }

    fn enhance(&self, _ctx: &TraverseContext, request: RequestTarget) -> RequestTarget {
        match request {
            RequestTarget::Text(text) => {
                let stripped = match strip_tracking_params(&text) {
                    Cow::Owned(stripped) => Some(stripped),
                    Cow::Borrowed(_) => None,
                };
                RequestTarget::Text(stripped.unwrap_or(text))
            }
            structured @ RequestTarget::Url(_) => structured,
        }
    }
}

pub fn default_request_chain() -> RequestChain { RequestChain::new().then(StripTrackingParams) }
