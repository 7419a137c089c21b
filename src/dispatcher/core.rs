use crate::error::ErrorPolicy;
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteMatch};
use crate::runtime_config::RuntimeConfig;
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for the hot path. Names are lowercased by the server.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed to a handler coroutine.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Correlates every log line of one request.
    pub request_id: RequestId,
    pub method: Method,
    /// Concrete request path (e.g. `/dogs/7`).
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    /// Parsed JSON body; `None` when the request had no body.
    pub body: Option<Value>,
    /// Channel for sending the response back to the dispatcher.
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Get a path parameter by name. Last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. Last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response sent back from a handler coroutine.
///
/// A `Value::Null` body means "no body"; the server writes nothing for it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// `{ "error": message }` with the given status.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    /// A response without a body, e.g. `204 No Content`.
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::json(status, Value::Null)
    }
}

/// Channel sender that feeds a handler coroutine.
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Routes requests to registered handler coroutines.
#[derive(Clone)]
pub struct Dispatcher {
    pub handlers: HashMap<String, HandlerSender>,
    /// Applied in insertion order.
    pub middlewares: Vec<Arc<dyn Middleware>>,
    error_policy: ErrorPolicy,
    runtime: RuntimeConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Empty dispatcher using the runtime config from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runtime_config(RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_runtime_config(runtime: RuntimeConfig) -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            middlewares: Vec::new(),
            error_policy: ErrorPolicy::default(),
            runtime,
        }
    }

    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Policy used by typed handlers registered after this call.
    pub fn set_error_policy(&mut self, policy: ErrorPolicy) {
        self.error_policy = policy;
    }

    #[must_use]
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Registered handler names, sorted.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Spawn a coroutine that runs `handler_fn` for every request sent to `name`.
    ///
    /// The handler must send exactly one response on `req.reply_tx`. A panic is
    /// caught and answered with a 500. Registering a name twice replaces the
    /// previous handler; its coroutine exits once its channel closes.
    ///
    /// # Safety
    ///
    /// Calls `may::coroutine::Builder::spawn`, which is unsafe in the `may`
    /// runtime. The caller must ensure the runtime is configured before any
    /// handler is registered and that `handler_fn` does not rely on
    /// thread-local state surviving across yields.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(HandlerRequest) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let stack_size = self.runtime.stack_size;
        let coroutine_name = name.to_string();

        // SAFETY: upheld by the caller, see the function docs. The closure owns
        // everything it touches (`handler_fn` is `Send + 'static`).
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(coroutine_name.clone())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(handler_name = %coroutine_name, stack_size, "Handler coroutine start");
                    for req in rx.iter() {
                        let reply_tx = req.reply_tx.clone();
                        let request_id = req.request_id;
                        let execution_start = Instant::now();

                        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            handler_fn(req);
                        }));

                        match outcome {
                            Ok(()) => debug!(
                                request_id = %request_id,
                                handler_name = %coroutine_name,
                                execution_time_us = execution_start.elapsed().as_micros(),
                                "Handler execution complete"
                            ),
                            Err(panic) => {
                                let panic_message = panic
                                    .downcast_ref::<&str>()
                                    .map(|s| (*s).to_string())
                                    .or_else(|| panic.downcast_ref::<String>().cloned())
                                    .unwrap_or_else(|| "non-string panic payload".to_string());
                                error!(
                                    request_id = %request_id,
                                    handler_name = %coroutine_name,
                                    panic_message = %panic_message,
                                    "Handler panicked"
                                );
                                let _ = reply_tx.send(HandlerResponse::error(500, "Internal Server Error"));
                            }
                        }
                    }
                    debug!(handler_name = %coroutine_name, "Handler coroutine exit");
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size,
                "Failed to spawn handler coroutine"
            );
            return;
        }

        if self.handlers.insert(name.to_string(), tx).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler registered"
            );
        }
    }

    /// Dispatch a matched request and wait for its response.
    ///
    /// Returns `None` if no handler is registered under the route's handler name.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        path: &str,
        body: Option<Value>,
        headers: HeaderVec,
        request_id: RequestId,
    ) -> Option<HandlerResponse> {
        let Some(tx) = self.handlers.get(&route_match.handler_name) else {
            error!(
                request_id = %request_id,
                handler_name = %route_match.handler_name,
                available_handlers = ?self.handler_names(),
                "Handler not found"
            );
            return None;
        };

        let (reply_tx, reply_rx) = mpsc::channel();
        let mut request = HandlerRequest {
            request_id,
            method: route_match.route.method.clone(),
            path: path.to_string(),
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            query_params: route_match.query_params,
            headers,
            body,
            reply_tx,
        };

        let mut early_resp: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            let resp = mw.before(&request);
            if early_resp.is_none() {
                early_resp = resp;
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => {
                debug!(request_id = %request_id, status = r.status, "Middleware answered early");
                (r, Duration::ZERO)
            }
            None => {
                let start = Instant::now();
                let outbound = request.clone();
                // Keep no handle on the reply channel here, so a handler that
                // never replies shows up as a closed channel.
                request.reply_tx = mpsc::channel().0;

                if let Err(e) = tx.send(outbound) {
                    error!(
                        request_id = %request_id,
                        handler_name = %request.handler_name,
                        error = %e,
                        "Failed to send request to handler"
                    );
                    return Some(HandlerResponse::error(503, "Service Unavailable"));
                }

                match reply_rx.recv() {
                    Ok(r) => (r, start.elapsed()),
                    Err(e) => {
                        error!(
                            request_id = %request_id,
                            handler_name = %request.handler_name,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            error = %e,
                            "Handler channel closed without a reply"
                        );
                        (HandlerResponse::error(503, "Service Unavailable"), start.elapsed())
                    }
                }
            }
        };

        for mw in &self.middlewares {
            mw.after(&request, &mut resp, latency);
        }

        Some(resp)
    }
}
