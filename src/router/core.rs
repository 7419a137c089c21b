//! Router core: pattern compilation and the per-request match.

use crate::routes::RouteMeta;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage for the hot path.
///
/// Names are `Arc<str>` shared with the compiled route table; values are
/// per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g. `{id}` -> `("id", "123")`).
    pub path_params: ParamVec,
    pub handler_name: String,
    /// Query string parameters, filled in by the server.
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name. Last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. Last occurrence wins (`?a=1&a=2` -> `2`).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A path pattern that could not be compiled.
#[derive(Debug)]
pub struct RouterError {
    pub pattern: String,
    pub source: regex::Error,
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid route pattern '{}': {}", self.pattern, self.source)
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

struct CompiledRoute {
    method: Method,
    regex: Regex,
    meta: Arc<RouteMeta>,
    param_names: Vec<Arc<str>>,
}

/// Matches `(method, path)` pairs against the route table.
#[derive(Clone)]
pub struct Router {
    routes: Arc<[CompiledRoute]>,
}

impl Router {
    /// Compile every route pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] if a pattern does not produce a valid regex.
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, RouterError> {
        let compiled = routes
            .into_iter()
            .map(|route| {
                let (regex, param_names) = Self::path_to_regex(&route.path_pattern)?;
                Ok(CompiledRoute {
                    method: route.method.clone(),
                    regex,
                    meta: Arc::new(route),
                    param_names: param_names.into_iter().map(Arc::from).collect(),
                })
            })
            .collect::<Result<Vec<_>, RouterError>>()?;

        let routes_summary: Vec<String> = compiled
            .iter()
            .map(|r| format!("{} {}", r.method, r.meta.path_pattern))
            .collect();
        info!(
            routes_count = compiled.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Self {
            routes: compiled.into(),
        })
    }

    /// Route metadata in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteMeta> {
        self.routes.iter().map(|r| r.meta.as_ref())
    }

    /// Match a request.
    ///
    /// Returns `None` when no pattern matches, or when the path matches but
    /// under a different method.
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        for route in self.routes.iter().filter(|r| r.method == method) {
            let Some(captures) = route.regex.captures(path) else {
                continue;
            };
            let path_params: ParamVec = route
                .param_names
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, value)| {
                    value.map(|v| (Arc::clone(name), v.as_str().to_string()))
                })
                .collect();

            let match_duration = match_start.elapsed();
            if match_duration > Duration::from_millis(1) {
                warn!(
                    method = %method,
                    path = %path,
                    handler_name = %route.meta.handler_name,
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %route.meta.handler_name,
                    route_pattern = %route.meta.path_pattern,
                    path_params = ?path_params,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }

            return Some(RouteMatch {
                route: Arc::clone(&route.meta),
                path_params,
                handler_name: route.meta.handler_name.clone(),
                query_params: ParamVec::new(),
            });
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Convert a path pattern to an anchored regex and its parameter names.
    ///
    /// `/dogs/{id}` becomes `^/dogs/([^/]+)/?$` with names `["id"]`. Literal
    /// segments are escaped.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), RouterError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| RouterError {
                pattern: path.to_string(),
                source,
            })
        };

        if path == "/" {
            return Ok((compile(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                pattern.push_str("/([^/]+)");
                param_names.push(name.to_string());
            } else {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push_str("/?$");
        Ok((compile(&pattern)?, param_names))
    }
}
