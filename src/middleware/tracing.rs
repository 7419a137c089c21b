use std::time::Duration;

use tracing::{debug, info, info_span, warn, Span};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs the start and outcome of every dispatched request.
///
/// Handlers run in their own coroutine, so a span entered here cannot be held
/// across the dispatch. Both hooks open an equivalent `request` span instead,
/// keyed by the request id.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMiddleware;

fn request_span(req: &HandlerRequest) -> Span {
    info_span!(
        "request",
        request_id = %req.request_id,
        method = %req.method,
        path = %req.path,
        handler = %req.handler_name
    )
}

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        request_span(req).in_scope(|| debug!("Request started"));
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        request_span(req).in_scope(|| {
            if res.status >= 500 {
                warn!(status = res.status, latency_ms, "Request failed");
            } else {
                info!(status = res.status, latency_ms, "Request completed");
            }
        });
    }
}
