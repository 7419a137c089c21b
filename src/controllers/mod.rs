//! One controller per endpoint.
//!
//! Each controller owns an `Arc<dyn DogStore>` handed over at registration and
//! implements [`Handler`](crate::typed::Handler). Request types do their own
//! parsing and validation in `TryFrom<HandlerRequest>`, so a controller body
//! only talks to the store.

mod create_dog;
mod delete_dog;
mod get_dog;
mod hello;
mod list_dogs;
mod update_dog;

pub use create_dog::{CreateDog, CreateDogRequest};
pub use delete_dog::DeleteDog;
pub use get_dog::GetDog;
pub use hello::{Hello, HelloRequest, HelloResponse};
pub use list_dogs::{ListDogs, ListDogsRequest};
pub use update_dog::{UpdateDog, UpdateDogRequest};

use crate::dispatcher::HandlerRequest;
use crate::error::ApiError;
use crate::validation::parse_id;

/// A request addressed to one record through its `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DogIdRequest {
    pub id: i64,
}

impl TryFrom<HandlerRequest> for DogIdRequest {
    type Error = ApiError;

    fn try_from(req: HandlerRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(req.get_path_param("id"))?,
        })
    }
}
