use may_minihttp::Response;
use serde_json::Value;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Write a handler result.
///
/// `Null` bodies (and every 204) are sent empty without a content type;
/// strings go out as `text/plain`, everything else as JSON.
pub fn write_handler_response(res: &mut Response, status: u16, body: Value) {
    res.status_code(usize::from(status), status_reason(status));
    match body {
        _ if status == 204 => {}
        Value::Null => {}
        Value::String(s) => {
            res.header("Content-Type: text/plain; charset=utf-8");
            res.body_vec(s.into_bytes());
        }
        other => {
            res.header("Content-Type: application/json");
            res.body_vec(other.to_string().into_bytes());
        }
    }
}

pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(usize::from(status), status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
