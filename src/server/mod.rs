//! HTTP front end on `may_minihttp`.
//!
//! [`AppService`] answers `/health` and `/metrics` itself, rejects bodies that
//! are not JSON, and hands everything else to the router and dispatcher.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use service::{health_endpoint, metrics_endpoint, AppService};
