//! Assembles the service from configuration and an injected store.

use crate::config::AppConfig;
use crate::dispatcher::Dispatcher;
use crate::middleware::{MetricsMiddleware, Middleware, TracingMiddleware};
use crate::registry;
use crate::router::Router;
use crate::routes::dog_routes;
use crate::runtime_config::RuntimeConfig;
use crate::server::{AppService, HttpServer, ServerHandle};
use crate::store::{DogStore, MemoryDogStore, SqliteDogStore};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Open the store named by `config`.
///
/// # Errors
///
/// The database cannot be opened or its schema cannot be created.
pub fn open_store(config: &AppConfig, memory: bool) -> anyhow::Result<Arc<dyn DogStore>> {
    if memory {
        info!(backend = "memory", "Using in-process dog store");
        return Ok(Arc::new(MemoryDogStore::new()));
    }
    let db = &config.database;
    let store = SqliteDogStore::open(&db.path, db.busy_timeout())
        .with_context(|| format!("failed to open database {}", db.path.display()))?;
    info!(
        backend = "sqlite",
        path = %db.path.display(),
        in_memory = db.is_in_memory(),
        "Opened SQLite dog store"
    );
    Ok(Arc::new(store))
}

/// Build the router, dispatcher and middleware around `store`.
///
/// # Errors
///
/// A route pattern fails to compile.
pub fn build_service(
    store: Arc<dyn DogStore>,
    config: &AppConfig,
    runtime: RuntimeConfig,
) -> anyhow::Result<AppService> {
    let router = Router::new(dog_routes()).context("failed to build routing table")?;

    let mut dispatcher = Dispatcher::with_runtime_config(runtime);
    dispatcher.set_error_policy(config.api);
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    let metrics = config.metrics.enabled.then(|| Arc::new(MetricsMiddleware::new()));
    if let Some(metrics) = &metrics {
        dispatcher.add_middleware(Arc::clone(metrics) as Arc<dyn Middleware>);
    }

    // SAFETY: called once during startup, before the server accepts requests.
    // Controllers own only their `Arc` store and keep no thread-local state.
    unsafe {
        registry::register_all(&mut dispatcher, store);
    }

    let mut service = AppService::new(router, dispatcher);
    if let Some(metrics) = metrics {
        service.set_metrics_middleware(metrics);
    }
    Ok(service)
}

/// Build the service and start listening on `config.http.addr`.
pub fn start(
    store: Arc<dyn DogStore>,
    config: &AppConfig,
    runtime: RuntimeConfig,
) -> anyhow::Result<ServerHandle> {
    may::config().set_stack_size(runtime.stack_size);
    let service = build_service(store, config, runtime)?;
    let handle = HttpServer(service)
        .start(config.http.addr.as_str())
        .with_context(|| format!("failed to bind {}", config.http.addr))?;
    Ok(handle)
}
