use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::data::{RequestTarget, TraversalResult, TraverseContext};

/// Post-fetch stage.
///
/// Implementations hold no per-traversal state; one instance is shared by
/// every concurrent traversal using the same options. A stage that does not
/// apply to its input returns the input unchanged.
#[async_trait]
pub trait ResultEnhancer: Send + Sync {
    /// Name of this stage for logging.
    fn name(&self) -> &'static str;

    async fn enhance(&self, ctx: &TraverseContext, result: TraversalResult) -> TraversalResult;
}

/// Pre-fetch stage rewriting the outbound request.
pub trait RequestEnhancer: Send + Sync {
    /// Name of this stage for logging.
    fn name(&self) -> &'static str;

    fn enhance(&self, ctx: &TraverseContext, request: RequestTarget) -> RequestTarget;
}

/// Ordered sequence of enhancers behaving as one.
///
/// Every stage runs, in order, on the output of the previous one with the
/// same context. An empty chain returns its input.
pub struct Chain<E: ?Sized> {
    stages: Vec<Arc<E>>,
}

pub type ResultChain = Chain<dyn ResultEnhancer>;
pub type RequestChain = Chain<dyn RequestEnhancer>;

impl<E: ?Sized> Chain<E> {
    pub fn new() -> Self { Self { stages: Vec::new() } }

    pub fn from_stages(stages: Vec<Arc<E>>) -> Self { Self { stages } }

    pub fn then_shared(mut self, stage: Arc<E>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Arc<E>] { &self.stages }

    pub fn len(&self) -> usize { self.stages.len() }

    pub fn is_empty(&self) -> bool { self.stages.is_empty() }
}

impl<E: ?Sized> Default for Chain<E> {
    fn default() -> Self { Self::new() }
}

impl<E: ?Sized> Clone for Chain<E> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
        }
    }
}

impl Chain<dyn ResultEnhancer> {
    pub fn then(self, stage: impl ResultEnhancer + 'static) -> Self { self.then_shared(Arc::new(stage)) }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

impl Chain<dyn RequestEnhancer> {
    pub fn then(self, stage: impl RequestEnhancer + 'static) -> Self { self.then_shared(Arc::new(stage)) }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

#[async_trait]
impl ResultEnhancer for Chain<dyn ResultEnhancer> {
    fn name(&self) -> &'static str { "chain" }

    async fn enhance(&self, ctx: &TraverseContext, result: TraversalResult) -> TraversalResult {
        let mut result = result;
        for stage in &self.stages {
            trace!(stage = stage.name(), kind = result.kind.name(), "applying result enhancer");
            result = stage.enhance(ctx, result).await;
        }
        result
    }
}

impl RequestEnhancer for Chain<dyn RequestEnhancer> {
    fn name(&self) -> &'static str { "chain" }

    fn enhance(&self, ctx: &TraverseContext, request: RequestTarget) -> RequestTarget {
        self.stages.iter().fold(request, |request, stage| {
            trace!(stage = stage.name(), "applying request enhancer");
            stage.enhance(ctx, request)
        })
    }
}
