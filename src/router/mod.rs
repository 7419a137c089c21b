//! # Router Module
//!
//! Path matching and route resolution.
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: at startup each path pattern (e.g. `/dogs/{id}`) is
//!    turned into an anchored regex that captures its placeholders.
//!
//! 2. **Matching**: for each request the path is tested against the compiled
//!    patterns for the request method, in registration order. The first hit
//!    wins and its captures become path parameters.
//!
//! A single trailing slash is tolerated, so `/dogs/` matches `/dogs`.
//!
//! ## Example
//!
//! ```rust
//! use dogs_api::router::Router;
//! use dogs_api::routes::dog_routes;
//! use http::Method;
//!
//! let router = Router::new(dog_routes()).unwrap();
//! let m = router.route(Method::GET, "/dogs/12").unwrap();
//! assert_eq!(m.handler_name, "get_dog");
//! assert_eq!(m.get_path_param("id"), Some("12"));
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, Router, RouterError, MAX_INLINE_PARAMS};
