use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::data::{RequestOptions, RequestTarget};
use crate::effects::body::ResponseBody;
use crate::effects::http::{HttpResponse, Transport};
use crate::error::{Result, TraverseError};

/// Canned response served by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    status:       u16,
    headers:      Vec<(String, String)>,
    body:         Bytes,
    terminal_url: Option<String>,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            terminal_url: None,
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self { Self::new(200, body) }

    pub fn html(body: impl Into<Bytes>) -> Self {
        Self::ok(body).with_header("Content-Type", "text/html; charset=utf-8")
    }

    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::ok(body).with_header("Content-Type", "application/json")
    }

    pub fn status(status: u16) -> Self { Self::new(status, Bytes::new()) }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Report a different final URL, as if the transport followed an HTTP
    /// redirect.
    pub fn with_terminal_url(mut self, url: impl Into<String>) -> Self {
        self.terminal_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone)]
enum MockRoute {
    Respond(MockResponse),
    Fail(String),
}

/// In-memory transport keyed by exact request URL.
///
/// Unknown URLs fail like an unresolvable host. Every request and every body
/// handed out is recorded so tests can inspect what the pipeline did.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes:   HashMap<String, MockRoute>,
    requests: Mutex<Vec<String>>,
    bodies:   Mutex<Vec<ResponseBody>>,
}

impl MockTransport {
    pub fn new() -> Self { Self::default() }

    pub fn respond(mut self, url: impl Into<String>, response: MockResponse) -> Self {
        self.routes.insert(url.into(), MockRoute::Respond(response));
        self
    }

    pub fn fail(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes.insert(url.into(), MockRoute::Fail(message.into()));
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Body handles issued so far, in order.
    pub fn bodies(&self) -> Vec<ResponseBody> {
        self.bodies.lock().map(|b| b.clone()).unwrap_or_default()
    }

    fn build(url: &str, response: &MockResponse) -> Result<HttpResponse> {
        let mut headers = HeaderMap::new();
        for (key, value) in &response.headers {
            let name = HeaderName::try_from(key.as_str()).map_err(TraverseError::transport)?;
            let value = HeaderValue::try_from(value.as_str()).map_err(TraverseError::transport)?;
            headers.append(name, value);
        }

        Ok(HttpResponse {
            status: response.status,
            url: response.terminal_url.clone().unwrap_or_else(|| url.to_string()),
            headers,
            body: ResponseBody::from_bytes(response.body.clone()),
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(
        &self,
        request: &RequestTarget,
        _options: Option<&RequestOptions>,
    ) -> Result<HttpResponse> {
        let url = request.as_str().to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.clone());
        }

        match self.routes.get(&url) {
            Some(MockRoute::Respond(response)) => {
                let response = Self::build(&url, response)?;
                if let Ok(mut bodies) = self.bodies.lock() {
                    bodies.push(response.body.clone());
                }
                Ok(response)
            }
            Some(MockRoute::Fail(message)) => Err(TraverseError::transport(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message.clone(),
            ))),
            None => Err(TraverseError::transport(io::Error::new(
                io::ErrorKind::NotFound,
                format!("failed to lookup address for {url}"),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_routes_and_records_requests() {
        let transport = MockTransport::new()
            .respond("https://a.test/", MockResponse::ok("body").with_header("X-Test", "1"))
            .fail("https://down.test/", "connection refused");

        let response = transport.fetch(&"https://a.test/".into(), None).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.headers.get("x-test").and_then(|v| v.to_str().ok()), Some("1"));
        assert_eq!(response.body.text().await.unwrap(), "body");

        assert!(transport.fetch(&"https://down.test/".into(), None).await.is_err());
        assert!(transport.fetch(&"https://unknown.test/".into(), None).await.is_err());
        assert_eq!(
            transport.requests(),
            vec!["https://a.test/", "https://down.test/", "https://unknown.test/"]
        );
        assert_eq!(transport.bodies().len(), 1);
    }
}
