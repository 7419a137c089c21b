use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;
use may_minihttp::Request;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    /// Lowercased header names.
    pub headers: HeaderVec,
    pub query_params: ParamVec,
    /// `None` when the request carried no body.
    pub body: Option<Value>,
    /// A body was sent but is not valid JSON.
    pub malformed_body: bool,
}

/// Split off and decode the query string of a request target.
#[must_use]
pub fn parse_query_params(target: &str) -> ParamVec {
    match target.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::<str>::from(k), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Interpret raw body bytes. Empty or whitespace-only bodies count as absent.
pub fn parse_body(bytes: &[u8]) -> Result<Option<Value>, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes).map(Some)
}

/// Look up a header in lowercased storage.
#[must_use]
pub fn header_value<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Extract everything the service needs from a `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let target = req.path().to_string();
    let path = target.split('?').next().unwrap_or("/").to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::<str>::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    debug!(header_count = headers.len(), "Headers extracted");

    let query_params = parse_query_params(&target);

    let mut raw = Vec::new();
    let (body, malformed_body) = match req.body().read_to_end(&mut raw) {
        Ok(_) => match parse_body(&raw) {
            Ok(body) => (body, false),
            Err(e) => {
                debug!(body_size_bytes = raw.len(), error = %e, "JSON body parse failed");
                (None, true)
            }
        },
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            (None, true)
        }
    };

    info!(
        method = %method,
        path = %path,
        query_count = query_params.len(),
        body_size_bytes = raw.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        query_params,
        body,
        malformed_body,
    }
}
