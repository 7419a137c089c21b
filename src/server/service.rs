use super::request::{header_value, parse_request, ParsedRequest};
use super::response::{write_handler_response, write_json_error};
use crate::dispatcher::Dispatcher;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::middleware::MetricsMiddleware;
use crate::router::Router;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::warn;

/// The `may_minihttp` service: built-in endpoints, routing and dispatch.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Option<Arc<MetricsMiddleware>>,
}

impl AppService {
    #[must_use]
    pub fn new(router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
            metrics: None,
        }
    }

    /// Serve `/metrics` from these counters.
    ///
    /// The same instance should be installed as dispatcher middleware, or only
    /// top-level requests will be counted.
    pub fn set_metrics_middleware(&mut self, metrics: Arc<MetricsMiddleware>) {
        self.metrics = Some(metrics);
    }
}

/// Health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_handler_response(res, 200, json!({ "status": "ok" }));
    Ok(())
}

/// Prometheus text exposition of the request counters.
pub fn metrics_endpoint(res: &mut Response, metrics: &MetricsMiddleware) -> io::Result<()> {
    write_handler_response(res, 200, serde_json::Value::String(metrics.render()));
    Ok(())
}

fn not_found(res: &mut Response, method: &str, path: &str) {
    write_json_error(
        res,
        404,
        json!({ "error": "Not Found", "method": method, "path": path }),
    );
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            query_params,
            body,
            malformed_body,
        } = parse_request(req);

        if method == "GET" && path == "/health" {
            if let Some(metrics) = &self.metrics {
                metrics.inc_top_level_request();
            }
            return health_endpoint(res);
        }
        if method == "GET" && path == "/metrics" {
            match &self.metrics {
                Some(metrics) => {
                    metrics.inc_top_level_request();
                    return metrics_endpoint(res, metrics);
                }
                None => {
                    not_found(res, &method, &path);
                    return Ok(());
                }
            }
        }

        let Ok(http_method) = method.parse::<Method>() else {
            write_json_error(res, 400, json!({ "error": "Bad Request", "method": method }));
            return Ok(());
        };
        let Some(mut route_match) = self.router.route(http_method, &path) else {
            not_found(res, &method, &path);
            return Ok(());
        };
        route_match.query_params = query_params;

        let request_id = RequestId::from_header_or_new(header_value(&headers, REQUEST_ID_HEADER));

        if malformed_body {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "Rejected request with malformed JSON body"
            );
            write_json_error(
                res,
                400,
                json!({ "errors": ["request body is not valid JSON"] }),
            );
            return Ok(());
        }

        match self
            .dispatcher
            .dispatch(route_match, &path, body, headers, request_id)
        {
            Some(hr) => write_handler_response(res, hr.status, hr.body),
            None => write_json_error(
                res,
                500,
                json!({
                    "error": "Handler failed or not registered",
                    "method": method,
                    "path": path
                }),
            ),
        }
        Ok(())
    }
}
