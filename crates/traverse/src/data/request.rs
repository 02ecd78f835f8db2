use std::fmt;
use std::time::Duration;

use http::Method;
use url::Url;

use crate::error::{Result, TraverseError};

/// What a traversal asks the transport for.
///
/// `Text` is a raw URL string and is subject to string-level request
/// enhancers. `Url` is an already structured descriptor that those
/// enhancers pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    Text(String),
    Url(Url),
}

impl RequestTarget {
    pub fn as_str(&self) -> &str {
        match self {
            RequestTarget::Text(text) => text,
            RequestTarget::Url(url) => url.as_str(),
        }
    }

    pub fn to_url(&self) -> Result<Url> {
        match self {
            RequestTarget::Text(text) => Url::parse(text.trim())
                .map_err(|e| TraverseError::InvalidRequest(format!("{text}: {e}"))),
            RequestTarget::Url(url) => Ok(url.clone()),
        }
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl From<&str> for RequestTarget {
    fn from(value: &str) -> Self { RequestTarget::Text(value.to_string()) }
}

impl From<String> for RequestTarget {
    fn from(value: String) -> Self { RequestTarget::Text(value) }
}

impl From<Url> for RequestTarget {
    fn from(value: Url) -> Self { RequestTarget::Url(value) }
}

/// Per-request transport configuration.
///
/// The timeout is handed to the transport as is; nothing in the traversal
/// pipeline enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method:  Method,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self { Self::default() }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
