//! HTTP client settings.
//!
//! [`ClientSetting`] describes how the production transport builds its
//! `reqwest::Client`. Settings can be read from the environment:
//!
//! | Variable                | Meaning                               |
//! |-------------------------|---------------------------------------|
//! | `TRAVERSE_PROXY`        | comma separated proxy URLs            |
//! | `TRAVERSE_TIMEOUT_SECS` | default request timeout in seconds    |
//! | `TRAVERSE_USER_AGENT`   | `User-Agent` header for every request |

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::error::TraverseError;

pub const PROXY_VAR: &str = "TRAVERSE_PROXY";
pub const TIMEOUT_VAR: &str = "TRAVERSE_TIMEOUT_SECS";
pub const USER_AGENT_VAR: &str = "TRAVERSE_USER_AGENT";

#[derive(Debug, Error)]
pub enum ClientSettingError {
    #[error("invalid proxy URL {url}: {source}")]
    ProxyUrl {
        url:    String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid timeout {value:?}: expected whole seconds")]
    Timeout { value: String },

    #[cfg(feature = "reqwest")]
    #[error("invalid proxy {url}: {source}")]
    Proxy {
        url:    String,
        #[source]
        source: reqwest::Error,
    },

    #[cfg(feature = "reqwest")]
    #[error("failed to build client: {0}")]
    Build(#[from] reqwest::Error),
}

impl From<ClientSettingError> for TraverseError {
    fn from(err: ClientSettingError) -> Self { TraverseError::Client(Box::new(err)) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSetting {
    pub proxies:    Option<Vec<Url>>,
    pub timeout:    Option<Duration>,
    pub user_agent: Option<String>,
}

impl ClientSetting {
    pub fn from_env() -> Result<Self, ClientSettingError> { Self::from_vars(std::env::vars()) }

    /// Read settings from `(name, value)` pairs. Unknown names are ignored,
    /// empty values count as unset.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ClientSettingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut setting = Self::default();
        for (key, value) in vars {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                PROXY_VAR => setting.proxies = Some(parse_proxies(value)?),
                TIMEOUT_VAR => {
                    let secs = value.parse::<u64>().map_err(|_| ClientSettingError::Timeout {
                        value: value.to_string(),
                    })?;
                    setting.timeout = Some(Duration::from_secs(secs));
                }
                USER_AGENT_VAR => setting.user_agent = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(setting)
    }

    pub fn with_proxy(mut self, proxy: Url) -> Self {
        self.proxies.get_or_insert_with(Vec::new).push(proxy);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client. `https` proxies carry HTTPS traffic, every other
    /// proxy carries plain HTTP.
    #[cfg(feature = "reqwest")]
    pub fn build(self) -> Result<reqwest::Client, ClientSettingError> {
        use reqwest::Proxy;

        let mut builder = reqwest::Client::builder();

        if let Some(proxies) = self.proxies {
            let (secure, insecure): (Vec<Url>, Vec<Url>) =
                proxies.into_iter().partition(|url| url.scheme() == "https");

            for url in secure {
                let proxy = Proxy::https(url.as_str()).map_err(|source| ClientSettingError::Proxy {
                    url: url.to_string(),
                    source,
                })?;
                builder = builder.proxy(proxy);
            }
            for url in insecure {
                let proxy = Proxy::http(url.as_str()).map_err(|source| ClientSettingError::Proxy {
                    url: url.to_string(),
                    source,
                })?;
                builder = builder.proxy(proxy);
            }
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(builder.build()?)
    }
}

fn parse_proxies(value: &str) -> Result<Vec<Url>, ClientSettingError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| {
            Url::parse(url).map_err(|source| ClientSettingError::ProxyUrl {
                url: url.to_string(),
                source,
            })
        })
        .collect()
}
