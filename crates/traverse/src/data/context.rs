use std::fmt;
use std::sync::Arc;

use crate::data::request::{RequestOptions, RequestTarget};
use crate::effects::Transport;
use crate::enhance::{RequestChain, ResultChain, default_request_chain, default_result_chain};

/// Default bound on meta-refresh hops followed by one traversal.
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;

/// Immutable traversal configuration shared by every context of a traversal.
///
/// # Examples
///
/// ```
/// use traverse::{MockTransport, TraverseOptions, ResultChain};
///
/// let options = TraverseOptions::new(MockTransport::new())
///     .with_content_enhancers(ResultChain::new())
///     .with_max_redirect_hops(3);
/// assert_eq!(options.max_redirect_hops, 3);
/// ```
#[derive(Clone)]
pub struct TraverseOptions {
    transport: Arc<dyn Transport>,

    /// Applied to the outbound request before the transport sees it.
    pub request_enhancer: RequestChain,

    /// Applied to every successful transport response.
    pub result_enhancer: ResultChain,

    /// Redirect depth after which a traversal fails with a redirect loop.
    pub max_redirect_hops: usize,
}

impl TraverseOptions {
    pub fn new(transport: impl Transport + 'static) -> Self { Self::from_shared(Arc::new(transport)) }

    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            request_enhancer: default_request_chain(),
            result_enhancer: default_result_chain(ResultChain::new()),
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
        }
    }

    /// Options backed by a [`ReqwestTransport`](crate::ReqwestTransport)
    /// configured from the environment.
    #[cfg(feature = "reqwest")]
    pub fn from_env() -> crate::error::Result<Self> {
        let setting = crate::config::ClientSetting::from_env()?;
        Ok(Self::new(crate::effects::ReqwestTransport::with_setting(setting)?))
    }

    pub fn transport(&self) -> &Arc<dyn Transport> { &self.transport }

    pub fn with_request_enhancer(mut self, chain: RequestChain) -> Self {
        self.request_enhancer = chain;
        self
    }

    /// Replace the whole result pipeline.
    pub fn with_result_enhancer(mut self, chain: ResultChain) -> Self {
        self.result_enhancer = chain;
        self
    }

    /// Use the default result pipeline with `content` as its final stage.
    pub fn with_content_enhancers(self, content: ResultChain) -> Self {
        self.with_result_enhancer(default_result_chain(content))
    }

    pub fn with_max_redirect_hops(mut self, hops: usize) -> Self {
        self.max_redirect_hops = hops;
        self
    }
}

impl fmt::Debug for TraverseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraverseOptions")
            .field("request_enhancer", &self.request_enhancer.stage_names())
            .field("result_enhancer", &self.result_enhancer.stage_names())
            .field("max_redirect_hops", &self.max_redirect_hops)
            .field("transport", &"{ ... }")
            .finish()
    }
}

/// Input of one traversal.
///
/// Contexts created while following a meta-refresh redirect point back to
/// the context that discovered the redirect through `parent`.
#[derive(Clone)]
pub struct TraverseContext {
    pub request:         RequestTarget,
    pub request_options: Option<RequestOptions>,
    pub label:           Option<String>,
    pub parent:          Option<Arc<TraverseContext>>,
    pub options:         Arc<TraverseOptions>,
}

impl TraverseContext {
    pub fn new(request: impl Into<RequestTarget>, options: impl Into<Arc<TraverseOptions>>) -> Self {
        Self {
            request:         request.into(),
            request_options: None,
            label:           None,
            parent:          None,
            options:         options.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_request_options(mut self, options: RequestOptions) -> Self {
        self.request_options = Some(options);
        self
    }

    /// Child context for following a redirect to `request`.
    pub fn redirect_to(&self, request: impl Into<RequestTarget>) -> Self {
        Self {
            request:         request.into(),
            request_options: self.request_options.clone(),
            label:           self.label.clone(),
            parent:          Some(Arc::new(self.clone())),
            options:         Arc::clone(&self.options),
        }
    }

    /// Contexts this one was derived from, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &TraverseContext> {
        std::iter::successors(self.parent.as_deref(), |ctx| ctx.parent.as_deref())
    }

    /// Number of redirect hops between the root context and this one.
    pub fn depth(&self) -> usize { self.ancestors().count() }
}

impl fmt::Debug for TraverseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraverseContext")
            .field("request", &self.request)
            .field("request_options", &self.request_options)
            .field("label", &self.label)
            .field("depth", &self.depth())
            .finish()
    }
}
