use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::{debug, trace};

use crate::data::{Successful, TraversalKind, TraversalResult, TraverseContext};
use crate::enhance::{RequestEnhancer, ResultEnhancer};
use crate::error::TraverseError;

/// Traverse one context: enhance the request, fetch it, and classify the
/// response through the result pipeline.
///
/// Never fails. Transport errors, redirect loops and body read failures are
/// reported as [`TraversalKind::Unsuccessful`]. A response body nobody read
/// is cancelled before this returns.
pub fn traverse(context: TraverseContext) -> BoxFuture<'static, TraversalResult> {
    Box::pin(async move {
        if let Some(error) = check_redirect_loop(&context) {
            debug!(request = %context.request, "refusing redirect loop");
            return TraversalResult::new(
                context.request.clone(),
                context.request_options.clone(),
                context.label.clone(),
                TraversalKind::Unsuccessful { error: Arc::new(error) },
            );
        }

        let options = Arc::clone(&context.options);
        let request = options.request_enhancer.enhance(&context, context.request.clone());
        debug!(request = %request, depth = context.depth(), "traversing");

        let response = match options
            .transport()
            .fetch(&request, context.request_options.as_ref())
            .await
        {
            Ok(response) => response,
            Err(error) => {
                debug!(request = %request, %error, "transport failed");
                return TraversalResult::new(
                    request,
                    context.request_options.clone(),
                    context.label.clone(),
                    TraversalKind::Unsuccessful { error: Arc::new(error) },
                );
            }
        };

        let body = response.body.clone();
        let terminal_url = response.url.clone();
        let result = TraversalResult::new(
            request,
            context.request_options.clone(),
            context.label.clone(),
            TraversalKind::Successful(Successful { response, terminal_url }),
        );

        let result = options.result_enhancer.enhance(&context, result).await;
        if body.cancel() {
            trace!(request = %result.request, "cancelled unread response body");
        }
        debug!(request = %result.request, kind = result.kind.name(), "traversal finished");
        result
    })
}

fn check_redirect_loop(context: &TraverseContext) -> Option<TraverseError> {
    let hops = context.depth();
    let url = context.request.as_str();
    let revisited = context.ancestors().any(|ancestor| ancestor.request.as_str() == url);
    if hops > context.options.max_redirect_hops || revisited {
        Some(TraverseError::RedirectLoop {
            url: url.to_string(),
            hops,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TraverseOptions;
    use crate::effects::{MockResponse, MockTransport};

    #[tokio::test]
    async fn transport_failure_is_unsuccessful() {
        let options = TraverseOptions::new(MockTransport::new().fail("https://down.test/", "refused"));
        let result = traverse(TraverseContext::new("https://down.test/", options)).await;

        assert!(result.is_unsuccessful());
        assert!(result.error().is_some_and(TraverseError::is_transport));
        assert!(result.provenance.is_none());
    }

    #[tokio::test]
    async fn contexts_beyond_the_hop_limit_are_rejected() {
        let options = TraverseOptions::new(MockTransport::new().respond("https://c.test/", MockResponse::ok("")))
            .with_max_redirect_hops(1);
        let ctx = TraverseContext::new("https://a.test/", options)
            .redirect_to("https://b.test/")
            .redirect_to("https://c.test/");

        let result = traverse(ctx).await;
        assert!(matches!(
            result.error(),
            Some(TraverseError::RedirectLoop { hops: 2, .. })
        ));
    }

    #[tokio::test]
    async fn revisiting_an_ancestor_is_rejected() {
        let options = TraverseOptions::new(MockTransport::new());
        let ctx = TraverseContext::new("https://a.test/", options)
            .redirect_to("https://b.test/")
            .redirect_to("https://a.test/");

        let result = traverse(ctx).await;
        assert!(matches!(result.error(), Some(TraverseError::RedirectLoop { .. })));
    }
}
