use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Prometheus-style counters for dispatched requests.
///
/// All counters are relaxed atomics: they are eventually consistent and never
/// block a request.
///
/// Metrics collected:
/// - total dispatched requests and their average latency
/// - responses per status class (`2xx`, `4xx`, `5xx`, ...)
/// - top-level requests that bypass dispatch (`/health`, `/metrics`)
/// - the stack size of the dispatching coroutine
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    /// Index `n` counts `(n+1)xx` responses.
    status_classes: [AtomicUsize; 5],
    top_level_requests: AtomicUsize,
    stack_size: AtomicUsize,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
            status_classes: Default::default(),
            top_level_requests: AtomicUsize::new(0),
            stack_size: AtomicUsize::new(0),
        }
    }
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean handler latency, zero before the first request.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Responses whose status falls in `class` (e.g. `4` for `4xx`).
    pub fn status_class_count(&self, class: u16) -> usize {
        class
            .checked_sub(1)
            .and_then(|idx| self.status_classes.get(usize::from(idx)))
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Count a request answered outside the dispatcher (`/health`, `/metrics`).
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size.load(Ordering::Relaxed)
    }

    /// Render all counters in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(1024);
        let _ = write!(
            out,
            "# HELP dogs_api_requests_total Total number of dispatched requests\n\
             # TYPE dogs_api_requests_total counter\n\
             dogs_api_requests_total {}\n\
             # HELP dogs_api_request_latency_seconds Average handler latency in seconds\n\
             # TYPE dogs_api_request_latency_seconds gauge\n\
             dogs_api_request_latency_seconds {}\n\
             # HELP dogs_api_top_level_requests_total Requests served outside the dispatcher\n\
             # TYPE dogs_api_top_level_requests_total counter\n\
             dogs_api_top_level_requests_total {}\n\
             # HELP dogs_api_coroutine_stack_bytes Stack size of the coroutine that dispatched the last request\n\
             # TYPE dogs_api_coroutine_stack_bytes gauge\n\
             dogs_api_coroutine_stack_bytes {}\n\
             # HELP dogs_api_responses_total Dispatched responses by status class\n\
             # TYPE dogs_api_responses_total counter\n",
            self.request_count(),
            self.average_latency().as_secs_f64(),
            self.top_level_request_count(),
            self.stack_size(),
        );
        for class in 1..=5u16 {
            let _ = writeln!(
                out,
                "dogs_api_responses_total{{class=\"{class}xx\"}} {}",
                self.status_class_count(class)
            );
        }
        out
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if let Some(counter) = (res.status / 100)
            .checked_sub(1)
            .and_then(|idx| self.status_classes.get(usize::from(idx)))
        {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        let stack = if may::coroutine::is_coroutine() {
            may::coroutine::current().stack_size()
        } else {
            may::config().get_stack_size()
        };
        self.stack_size.store(stack, Ordering::Relaxed);
    }
}
