//! Enhancers: ordered stages that refine a request or a result.
//!
//! Request enhancers rewrite the outbound [`RequestTarget`](crate::RequestTarget)
//! synchronously. Result enhancers take a
//! [`TraversalResult`](crate::TraversalResult) and return it unchanged or a
//! refined successor. Both kinds compose with [`Chain`].

mod chain;
mod request;
mod result;

pub use chain::{Chain, RequestChain, RequestEnhancer, ResultChain, ResultEnhancer};
pub use request::{StripTrackingParams, default_request_chain};
pub use result::{
    ContentEnhancers, DetectStructuredContent, ExtractText, FollowMetaRefresh, NormalizeLabel,
    ValidateStatus, default_result_chain,
};
