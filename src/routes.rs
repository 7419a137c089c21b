//! The route table.
//!
//! Routes are declared in code rather than loaded from a document: the API
//! surface is small and fixed, and each entry names the handler that serves it.

use http::Method;

pub const HELLO: &str = "hello";
pub const LIST_DOGS: &str = "list_dogs";
pub const GET_DOG: &str = "get_dog";
pub const CREATE_DOG: &str = "create_dog";
pub const UPDATE_DOG: &str = "update_dog";
pub const DELETE_DOG: &str = "delete_dog";

/// One entry of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Path with `{name}` placeholders, e.g. `/dogs/{id}`.
    pub path_pattern: String,
    pub handler_name: String,
}

impl RouteMeta {
    #[must_use]
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// Every route the service answers, in registration order.
#[must_use]
pub fn dog_routes() -> Vec<RouteMeta> {
    vec![
        RouteMeta::new(Method::GET, "/", HELLO),
        RouteMeta::new(Method::GET, "/dogs", LIST_DOGS),
        RouteMeta::new(Method::GET, "/dogs/{id}", GET_DOG),
        RouteMeta::new(Method::POST, "/dogs", CREATE_DOG),
        RouteMeta::new(Method::PATCH, "/dogs/{id}", UPDATE_DOG),
        RouteMeta::new(Method::DELETE, "/dogs/{id}", DELETE_DOG),
    ]
}
