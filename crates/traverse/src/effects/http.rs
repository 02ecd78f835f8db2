use async_trait::async_trait;
use http::HeaderMap;

use crate::data::{RequestOptions, RequestTarget};
use crate::effects::body::ResponseBody;
use crate::error::Result;

/// A response as returned by the transport, before any classification.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status:  u16,
    /// URL the transport ended up at after following HTTP redirects.
    pub url:     String,
    pub headers: HeaderMap,
    pub body:    ResponseBody,
}

/// Asynchronous HTTP transport abstraction.
///
/// Implementations follow HTTP-level redirects themselves and apply the
/// timeout from [`RequestOptions`]. Any failure to obtain a response (DNS,
/// connect, TLS, timeout) is reported as an error; non-success statuses are
/// ordinary responses.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: production implementation using `reqwest`
/// - [`MockTransport`](crate::effects::MockTransport): in-memory routes for tests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        request: &RequestTarget,
        options: Option<&RequestOptions>,
    ) -> Result<HttpResponse>;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::config::ClientSetting;
    use crate::error::TraverseError;
    use futures_util::StreamExt;

    /// Production transport backed by a `reqwest::Client`.
    ///
    /// The client keeps reqwest's default redirect policy, so HTTP redirects
    /// are resolved before a response reaches the enhancers.
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self> { Self::with_setting(ClientSetting::default()) }

        pub fn with_setting(setting: ClientSetting) -> Result<Self> {
            Ok(Self {
                client: setting.build()?,
            })
        }

        pub fn from_client(client: reqwest::Client) -> Self { Self { client } }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn fetch(
            &self,
            request: &RequestTarget,
            options: Option<&RequestOptions>,
        ) -> Result<HttpResponse> {
            let url = request.to_url()?;
            let options = options.cloned().unwrap_or_default();

            let mut builder = self.client.request(options.method, url);
            for (key, value) in &options.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            if let Some(timeout) = options.timeout {
                builder = builder.timeout(timeout);
            }

            let response = builder.send().await.map_err(TraverseError::transport)?;
            let status = response.status().as_u16();
            let url = response.url().to_string();
            let headers = response.headers().clone();
            let stream = response.bytes_stream().map(|chunk| chunk.map_err(TraverseError::body));

            Ok(HttpResponse {
                status,
                url,
                headers,
                body: ResponseBody::new(Box::pin(stream)),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;
