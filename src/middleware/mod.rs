//! Hooks that run around every dispatched request.
//!
//! A [`Middleware`] sees the request before the handler runs (and may answer
//! early) and the response after it, together with the handler latency.

mod core;
mod metrics;
mod tracing;

pub use core::Middleware;
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
