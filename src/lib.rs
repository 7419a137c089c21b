//! # dogs-api
//!
//! A small HTTP service that manages dog records (`id`, `name`, `description`,
//! `breed`, `age`), running on the `may` coroutine runtime.
//!
//! ## Overview
//!
//! Six routes are served:
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/` | `hello` |
//! | `GET` | `/dogs` | `list_dogs` (optional `nameHas` filter) |
//! | `GET` | `/dogs/{id}` | `get_dog` |
//! | `POST` | `/dogs` | `create_dog` |
//! | `PATCH` | `/dogs/{id}` | `update_dog` |
//! | `DELETE` | `/dogs/{id}` | `delete_dog` |
//!
//! plus `/health` and, when enabled, Prometheus text at `/metrics`.
//!
//! ## Architecture
//!
//! - **[`server`]** - `may_minihttp` service: parses requests, serves `/health` and `/metrics`
//! - **[`router`]** - regex path matching into a [`router::RouteMatch`]
//! - **[`dispatcher`]** - one coroutine per handler, fed over MPSC channels
//! - **[`middleware`]** - tracing spans and request metrics around each dispatch
//! - **[`typed`]** - typed request/response handlers with an [`error::ApiError`] channel
//! - **[`controllers`]** - the six operations
//! - **[`validation`]** - field checks for create and partial update bodies
//! - **[`store`]** - the [`store::DogStore`] seam, with in-memory and SQLite backends
//! - **[`config`]** / **[`runtime_config`]** / **[`logging`]** - YAML + environment configuration
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as AppService<br/>(may_minihttp)
//!     participant Router as Router
//!     participant Dispatcher as Dispatcher
//!     participant Middleware as Middleware Chain
//!     participant Handler as Controller<br/>(Coroutine)
//!     participant Store as DogStore
//!
//!     Client->>Server: PATCH /dogs/7 {"age": 4}
//!     Server->>Server: Parse method, query, headers, JSON body
//!
//!     alt Body is not JSON
//!         Server-->>Client: 400 {"errors": [...]}
//!     end
//!
//!     Server->>Router: route(PATCH, "/dogs/7")
//!
//!     alt No Route Match
//!         Router-->>Client: 404 {"error": "Not Found"}
//!     end
//!
//!     Router-->>Server: RouteMatch (update_dog, {id: "7"})
//!     Server->>Dispatcher: dispatch(route_match, body, headers, request_id)
//!     Dispatcher->>Middleware: before()
//!     Dispatcher->>Handler: HandlerRequest over channel
//!     Handler->>Handler: parse id, validate body
//!     Handler->>Store: update(7, patch)
//!     Store-->>Handler: Some(dog)
//!     Handler-->>Dispatcher: HandlerResponse 201
//!
//!     alt Handler Panics
//!         Dispatcher-->>Client: 500 Internal Server Error
//!     end
//!
//!     Dispatcher->>Middleware: after() (log, metrics)
//!     Dispatcher-->>Server: HandlerResponse
//!     Server-->>Client: 201 + JSON body
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use dogs_api::{app, config::AppConfig, runtime_config::RuntimeConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let store = app::open_store(&config, false)?;
//! let handle = app::start(store, &config, RuntimeConfig::from_env())?;
//! handle.join().ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! Handlers run in `may` coroutines, not on tokio. The coroutine stack size is
//! read from `DOGS_STACK_SIZE` (decimal or `0x` hex, default 64 KiB). Store
//! calls block the handler coroutine; SQLite access is serialised through a
//! single connection.

pub mod app;
pub mod cli;
pub mod config;
pub mod controllers;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod registry;
pub mod router;
pub mod routes;
pub mod runtime_config;
pub mod server;
pub mod store;
pub mod typed;
pub mod validation;

pub use error::{ApiError, ErrorPolicy, NotFoundStatus};
pub use model::{Dog, DogFilter, DogPatch, NewDog};
pub use routes::RouteMeta;
pub use store::{DogStore, MemoryDogStore, SqliteDogStore, StoreError};
