//! # Typed Module
//!
//! Type-safe request and response handling on top of the raw dispatcher.
//!
//! A typed handler declares:
//!
//! - a `Request` type built from the raw [`HandlerRequest`](crate::dispatcher::HandlerRequest)
//!   through `TryFrom`. Parsing and validation live in that conversion, so a
//!   handler only ever sees well-formed input;
//! - a `Response` type that is serialized to JSON;
//! - the status used on success (`200` unless overridden).
//!
//! Failures on either side are [`ApiError`](crate::error::ApiError) values and
//! are rendered with the dispatcher's [`ErrorPolicy`](crate::error::ErrorPolicy).
//!
//! ```rust,ignore
//! struct GetDog { store: Arc<dyn DogStore> }
//!
//! impl Handler for GetDog {
//!     type Request = DogIdRequest;
//!     type Response = Dog;
//!
//!     fn handle(&self, req: TypedHandlerRequest<DogIdRequest>) -> Result<Dog, ApiError> {
//!         self.store.find_by_id(req.data.id)?.ok_or(ApiError::NotFound)
//!     }
//! }
//! ```

mod core;

pub use core::*;
