//! # traverse
//!
//! Fetch an HTTP resource and classify what came back.
//!
//! A traversal runs a request through a pipeline of request enhancers, hands
//! it to a [`Transport`], and then refines the response through a chain of
//! result enhancers: status validation, structured content detection, text
//! extraction, and HTML meta-refresh following. The outcome is a
//! [`TraversalResult`] whose [`TraversalKind`] says how far classification
//! got, with every intermediate step kept in its provenance chain.
//!
//! Failures never escape [`traverse`]: a DNS error is an unsuccessful result,
//! a 404 is an invalid-status result, and a download that wrote too few bytes
//! is a download result whose outcome reports the mismatch.
//!
//! ## Example
//!
//! ```no_run
//! use traverse::{TraverseContext, TraverseOptions, traverse};
//!
//! # async fn run() -> traverse::Result<()> {
//! let options = TraverseOptions::from_env()?;
//! let result = traverse(TraverseContext::new("https://example.com/?utm_source=x", options)).await;
//!
//! if let Some(text) = result.final_result().as_text() {
//!     println!("{}", text.body_text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: header, URL and HTML helpers
//! - [`data`]: contexts, requests and the result lattice
//! - [`effects`]: transport, response body and sinks
//! - [`enhance`]: enhancer traits, chains and the default stages
//! - [`json`]: typed JSON fetching
//! - [`download`]: writing content to disk
//! - [`config`]: HTTP client settings

pub mod config;
pub mod core;
pub mod data;
pub mod download;
pub mod effects;
pub mod enhance;
mod error;
pub mod json;
mod traverse;

pub use self::config::{ClientSetting, ClientSettingError};
pub use self::data::{
    RequestOptions, RequestTarget, TraversalContent, TraversalKind, TraversalResult, TraverseContext,
    TraverseOptions,
};
pub use self::download::{DownloadContent, DownloadOutcome};
#[cfg(feature = "reqwest")]
pub use self::effects::ReqwestTransport;
pub use self::effects::{ByteSink, FileSink, HttpResponse, MockResponse, MockTransport, Transport};
pub use self::enhance::{RequestChain, RequestEnhancer, ResultChain, ResultEnhancer};
pub use self::error::{BoxError, Result, TraverseError};
pub use self::json::{JsonOptions, ParseJson, safe_fetch_json};
pub use self::traverse::traverse;
