//! End-to-end HTTP tests for the dog records API
//!
//! # Test Strategy
//!
//! Each test starts the real `may_minihttp` server on a random port through
//! [`DogsTestServer`] and talks to it over raw `TcpStream`s. Records live in a
//! `MemoryDogStore` unless a test injects its own store.
//!
//! # Coverage
//!
//! - CRUD on `/dogs` and the greeting on `/`
//! - Validation errors (missing fields, wrong types, unknown keys)
//! - Id parsing before any store access
//! - Not-found policy (404 default, 204 configured)
//! - Persistence failures with and without exposed detail
//! - Built-in `/health` and `/metrics`, unknown routes, malformed JSON

use dogs_api::config::AppConfig;
use dogs_api::error::{ErrorPolicy, NotFoundStatus};
use dogs_api::model::{Dog, DogFilter, DogPatch, NewDog};
use dogs_api::store::{DogStore, MemoryDogStore, StoreError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::test_server::DogsTestServer;

const REX: &str = r#"{"name":"Rex","description":"friendly","breed":"lab","age":3}"#;

/// Delegates to a memory store and counts every call.
#[derive(Default)]
struct CountingStore {
    inner: MemoryDogStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl DogStore for CountingStore {
    fn find_many(&self, filter: &DogFilter) -> Result<Vec<Dog>, StoreError> {
        self.touch();
        self.inner.find_many(filter)
    }
    fn find_by_id(&self, id: i64) -> Result<Option<Dog>, StoreError> {
        self.touch();
        self.inner.find_by_id(id)
    }
    fn create(&self, dog: NewDog) -> Result<Dog, StoreError> {
        self.touch();
        self.inner.create(dog)
    }
    fn update(&self, id: i64, patch: DogPatch) -> Result<Option<Dog>, StoreError> {
        self.touch();
        self.inner.update(id, patch)
    }
    fn delete(&self, id: i64) -> Result<Option<Dog>, StoreError> {
        self.touch();
        self.inner.delete(id)
    }
}

/// Rejects every write and fails every read.
struct BrokenStore;

impl DogStore for BrokenStore {
    fn find_many(&self, _filter: &DogFilter) -> Result<Vec<Dog>, StoreError> {
        Err(StoreError::Backend("disk I/O error".into()))
    }
    fn find_by_id(&self, _id: i64) -> Result<Option<Dog>, StoreError> {
        Err(StoreError::Backend("disk I/O error".into()))
    }
    fn create(&self, _dog: NewDog) -> Result<Dog, StoreError> {
        Err(StoreError::ConstraintViolated(
            "NOT NULL constraint failed: dogs.name".into(),
        ))
    }
    fn update(&self, _id: i64, _patch: DogPatch) -> Result<Option<Dog>, StoreError> {
        Err(StoreError::ConstraintViolated("CHECK constraint failed".into()))
    }
    fn delete(&self, _id: i64) -> Result<Option<Dog>, StoreError> {
        Err(StoreError::Backend("database is locked".into()))
    }
}

fn create_rex(server: &DogsTestServer) -> i64 {
    let resp = server.request("POST", "/dogs", Some(REX));
    assert_eq!(resp.status, 201, "create failed: {}", resp.body);
    resp.json()["id"].as_i64().expect("id")
}

#[test]
fn test_hello_world() {
    let server = DogsTestServer::new();
    let resp = server.request("GET", "/", None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json(), json!({ "message": "Hello World!" }));
}

#[test]
fn test_create_assigns_id_and_echoes_fields() {
    let server = DogsTestServer::new();
    let resp = server.request("POST", "/dogs", Some(REX));
    assert_eq!(resp.status, 201);
    assert!(resp
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("application/json")));

    let body = resp.json();
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["name"], "Rex");
    assert_eq!(body["description"], "friendly");
    assert_eq!(body["breed"], "lab");
    assert_eq!(body["age"], 3);
}

#[test]
fn test_create_without_breed_serializes_null() {
    let server = DogsTestServer::new();
    let resp = server.request(
        "POST",
        "/dogs",
        Some(r#"{"name":"Bo","description":"calm","age":7}"#),
    );
    assert_eq!(resp.status, 201);
    assert!(resp.json()["breed"].is_null());
}

#[test]
fn test_create_missing_required_fields() {
    let server = DogsTestServer::new();
    let resp = server.request("POST", "/dogs", Some(r#"{"breed":"lab"}"#));
    assert_eq!(resp.status, 400);
    assert_eq!(
        resp.json(),
        json!({
            "errors": [
                "name should be a string",
                "description should be a string",
                "age should be a number"
            ]
        })
    );
    assert!(server.store.find_many(&DogFilter::default()).unwrap().is_empty());
}

#[test]
fn test_create_rejects_unknown_keys() {
    let server = DogsTestServer::new();
    let resp = server.request(
        "POST",
        "/dogs",
        Some(r#"{"name":"Rex","description":"friendly","age":3,"color":"brown"}"#),
    );
    assert_eq!(resp.status, 400);
    let errors = resp.json()["errors"].clone();
    assert_eq!(errors, json!(["'color' is not a valid key"]));
}

#[test]
fn test_create_without_body() {
    let server = DogsTestServer::new();
    let resp = server.request("POST", "/dogs", None);
    assert_eq!(resp.status, 400);
    assert_eq!(resp.json()["errors"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_create_with_array_body() {
    let server = DogsTestServer::new();
    let resp = server.request("POST", "/dogs", Some("[1,2]"));
    assert_eq!(resp.status, 400);
    assert_eq!(
        resp.json(),
        json!({ "errors": ["request body should be a JSON object"] })
    );
}

#[test]
fn test_malformed_json_is_rejected_before_dispatch() {
    let store = Arc::new(CountingStore::default());
    let server = DogsTestServer::with_store(store.clone(), AppConfig::default());
    let resp = server.request("POST", "/dogs", Some(r#"{"name": "Rex""#));
    assert_eq!(resp.status, 400);
    assert_eq!(
        resp.json(),
        json!({ "errors": ["request body is not valid JSON"] })
    );
    assert_eq!(store.calls(), 0);
}

#[test]
fn test_list_and_filter_by_name() {
    let server = DogsTestServer::new();
    for name in ["Rex", "Max", "Rexy"] {
        let body = json!({ "name": name, "description": "d", "age": 1 }).to_string();
        assert_eq!(server.request("POST", "/dogs", Some(&body)).status, 201);
    }

    let all = server.request("GET", "/dogs", None);
    assert_eq!(all.status, 200);
    let names: Vec<_> = all.json().as_array().unwrap().iter().map(|d| d["name"].clone()).collect();
    assert_eq!(names, vec![json!("Rex"), json!("Max"), json!("Rexy")]);

    let filtered = server.request("GET", "/dogs?nameHas=Rex", None);
    assert_eq!(filtered.status, 200);
    let names: Vec<_> = filtered
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("Rex"), json!("Rexy")]);

    let case = server.request("GET", "/dogs?nameHas=rex", None);
    assert_eq!(case.json(), json!([]));

    let empty = server.request("GET", "/dogs?nameHas=", None);
    assert_eq!(empty.json().as_array().map(Vec::len), Some(3));
}

#[test]
fn test_get_existing_dog() {
    let server = DogsTestServer::new();
    let id = create_rex(&server);
    let resp = server.request("GET", &format!("/dogs/{id}"), None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["name"], "Rex");
    assert_eq!(resp.json()["id"], id);
}

#[test]
fn test_get_missing_dog_is_404_by_default() {
    let server = DogsTestServer::new();
    let resp = server.request("GET", "/dogs/999", None);
    assert_eq!(resp.status, 404);
    assert_eq!(resp.json(), json!({ "error": "Dog not found" }));
}

#[test]
fn test_not_found_policy_204() {
    let config = AppConfig {
        api: ErrorPolicy {
            not_found_status: NotFoundStatus::NoContent,
            expose_store_errors: false,
        },
        ..AppConfig::default()
    };
    let server = DogsTestServer::with_config(config);

    for (method, body) in [
        ("GET", None),
        ("PATCH", Some(r#"{"age":4}"#)),
        ("DELETE", None),
    ] {
        let resp = server.request(method, "/dogs/42", body);
        assert_eq!(resp.status, 204, "{method}");
        assert!(resp.body.is_empty(), "{method}: {:?}", resp.body);
    }
}

#[test]
fn test_invalid_id_never_reaches_store() {
    let store = Arc::new(CountingStore::default());
    let server = DogsTestServer::with_store(store.clone(), AppConfig::default());

    for (method, body) in [
        ("GET", None),
        ("PATCH", Some(r#"{"age":4}"#)),
        ("PATCH", Some(r#"{"age":"old"}"#)),
        ("DELETE", None),
    ] {
        let resp = server.request(method, "/dogs/abc", body);
        assert_eq!(resp.status, 400, "{method}");
        assert_eq!(resp.json(), json!({ "message": "id should be a number" }));
    }
    assert_eq!(store.calls(), 0);
}

#[test]
fn test_update_changes_only_given_fields() {
    let server = DogsTestServer::new();
    let id = create_rex(&server);

    let resp = server.request("PATCH", &format!("/dogs/{id}"), Some(r#"{"name":"Max"}"#));
    assert_eq!(resp.status, 201);
    assert_eq!(
        resp.json(),
        json!({ "id": id, "name": "Max", "description": "friendly", "breed": "lab", "age": 3 })
    );

    let stored = server.store.find_by_id(id).unwrap().unwrap();
    assert_eq!(stored.name, "Max");
    assert_eq!(stored.breed.as_deref(), Some("lab"));
}

#[test]
fn test_fractional_age_round_trips() {
    let server = DogsTestServer::new();
    let resp = server.request(
        "POST",
        "/dogs",
        Some(r#"{"name":"Pip","description":"puppy","age":0.5}"#),
    );
    assert_eq!(resp.status, 201);
    let id = resp.json()["id"].as_i64().unwrap();
    assert_eq!(resp.json()["age"], 0.5);

    let resp = server.request("PATCH", &format!("/dogs/{id}"), Some(r#"{"age":2.5}"#));
    assert_eq!(resp.status, 201);
    assert_eq!(resp.json()["age"], 2.5);
    assert_eq!(server.store.find_by_id(id).unwrap().unwrap().age, 2.5);
}

#[test]
fn test_update_null_breed_clears_it() {
    let server = DogsTestServer::new();
    let id = create_rex(&server);
    let resp = server.request("PATCH", &format!("/dogs/{id}"), Some(r#"{"breed":null}"#));
    assert_eq!(resp.status, 201);
    assert!(resp.json()["breed"].is_null());
}

#[test]
fn test_update_validation_errors() {
    let server = DogsTestServer::new();
    let id = create_rex(&server);
    let resp = server.request(
        "PATCH",
        &format!("/dogs/{id}"),
        Some(r#"{"name":null,"age":"two","owner":"me"}"#),
    );
    assert_eq!(resp.status, 400);
    assert_eq!(
        resp.json(),
        json!({
            "errors": [
                "name should be a string",
                "age should be a number",
                "'owner' is not a valid key"
            ]
        })
    );
    assert_eq!(server.store.find_by_id(id).unwrap().unwrap().name, "Rex");
}

#[test]
fn test_update_missing_dog() {
    let server = DogsTestServer::new();
    let resp = server.request("PATCH", "/dogs/77", Some(r#"{"age":4}"#));
    assert_eq!(resp.status, 404);
}

#[test]
fn test_delete_returns_removed_dog() {
    let server = DogsTestServer::new();
    let id = create_rex(&server);

    let resp = server.request("DELETE", &format!("/dogs/{id}"), None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["name"], "Rex");
    assert!(server.store.find_by_id(id).unwrap().is_none());
}

#[test]
fn test_delete_missing_dog_removes_nothing() {
    let server = DogsTestServer::new();
    let id = create_rex(&server);

    let resp = server.request("DELETE", &format!("/dogs/{}", id + 100), None);
    assert_eq!(resp.status, 404);
    assert_eq!(server.request("GET", "/dogs", None).json().as_array().map(Vec::len), Some(1));
}

#[test]
fn test_persistence_failure_is_generic_by_default() {
    let server = DogsTestServer::with_store(Arc::new(BrokenStore), AppConfig::default());

    let resp = server.request("POST", "/dogs", Some(REX));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.json(), json!({ "error": "could not create dog" }));

    let resp = server.request("PATCH", "/dogs/1", Some(r#"{"age":1}"#));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.json(), json!({ "error": "could not update dog" }));

    let resp = server.request("DELETE", "/dogs/1", None);
    assert_eq!(resp.status, 400);
    assert_eq!(resp.json(), json!({ "error": "could not delete dog" }));
}

#[test]
fn test_persistence_failure_detail_when_exposed() {
    let config = AppConfig {
        api: ErrorPolicy {
            not_found_status: NotFoundStatus::NotFound,
            expose_store_errors: true,
        },
        ..AppConfig::default()
    };
    let server = DogsTestServer::with_store(Arc::new(BrokenStore), config);
    let resp = server.request("POST", "/dogs", Some(REX));
    assert_eq!(resp.status, 400);
    let body = resp.json();
    assert_eq!(body["error"], "could not create dog");
    assert!(body["detail"].as_str().unwrap().contains("NOT NULL"));
}

#[test]
fn test_read_failure_is_internal_error() {
    let server = DogsTestServer::with_store(Arc::new(BrokenStore), AppConfig::default());
    for path in ["/dogs", "/dogs/1"] {
        let resp = server.request("GET", path, None);
        assert_eq!(resp.status, 500, "{path}");
        assert_eq!(resp.json(), json!({ "error": "Internal Server Error" }));
    }
}

#[test]
fn test_unknown_route_and_method() {
    let server = DogsTestServer::new();

    let resp = server.request("GET", "/cats", None);
    assert_eq!(resp.status, 404);
    assert_eq!(
        resp.json(),
        json!({ "error": "Not Found", "method": "GET", "path": "/cats" })
    );

    let resp = server.request("PUT", "/dogs/1", Some(REX));
    assert_eq!(resp.status, 404);
    assert_eq!(resp.json()["method"], "PUT");
}

#[test]
fn test_request_id_header_is_accepted() {
    let server = DogsTestServer::new();
    let resp = server.request_with_headers(
        "GET",
        "/",
        &[("X-Request-Id", "01ARZ3NDEKTSV4RRFFQ69G5FAV")],
        None,
    );
    assert_eq!(resp.status, 200);
}

#[test]
fn test_health_endpoint() {
    let server = DogsTestServer::new();
    let resp = server.request("GET", "/health", None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json(), json!({ "status": "ok" }));
}

#[test]
fn test_metrics_endpoint_counts_requests() {
    let server = DogsTestServer::new();
    create_rex(&server);
    assert_eq!(server.request("GET", "/dogs/999", None).status, 404);

    let resp = server.request("GET", "/metrics", None);
    assert_eq!(resp.status, 200);
    assert!(resp
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("text/plain")));
    assert!(resp.body.contains("dogs_api_requests_total 2"));
    assert!(resp.body.contains("dogs_api_responses_total{class=\"2xx\"} 1"));
    assert!(resp.body.contains("dogs_api_responses_total{class=\"4xx\"} 1"));
}

#[test]
fn test_metrics_disabled() {
    let mut config = AppConfig::default();
    config.metrics.enabled = false;
    let server = DogsTestServer::with_config(config);
    assert_eq!(server.request("GET", "/metrics", None).status, 404);
    assert_eq!(server.request("GET", "/health", None).status, 200);
}
