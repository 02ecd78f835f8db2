//! Immutable data types for traversals.
//!
//! Contexts and options describe what to fetch and how to process it;
//! results describe what came back.

pub mod context;
pub mod request;
pub mod result;

pub use context::{DEFAULT_MAX_REDIRECT_HOPS, TraverseContext, TraverseOptions};
pub use request::{RequestOptions, RequestTarget};
pub use result::{
    ContentDetail, ContentRedirect, DownloadedContent, InvalidHttpStatus, JsonContent, Provenance,
    Successful, TextContent, TraversalContent, TraversalKind, TraversalResult,
};
