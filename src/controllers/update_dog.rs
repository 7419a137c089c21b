use crate::dispatcher::HandlerRequest;
use crate::error::ApiError;
use crate::model::{Dog, DogPatch};
use crate::store::DogStore;
use crate::typed::{Handler, TypedHandlerRequest};
use crate::validation::{parse_id, validate_update};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDogRequest {
    pub id: i64,
    pub patch: DogPatch,
}

impl TryFrom<HandlerRequest> for UpdateDogRequest {
    type Error = ApiError;

    /// The id is checked first: a bad id is reported even when the body is also invalid.
    fn try_from(req: HandlerRequest) -> Result<Self, Self::Error> {
        let id = parse_id(req.get_path_param("id"))?;
        let patch = validate_update(req.body.as_ref()).map_err(ApiError::Validation)?;
        Ok(Self { id, patch })
    }
}

/// `PATCH /dogs/{id}`. Answers 201 with the updated record.
pub struct UpdateDog {
    pub store: Arc<dyn DogStore>,
}

impl Handler for UpdateDog {
    type Request = UpdateDogRequest;
    type Response = Dog;

    const SUCCESS_STATUS: u16 = 201;

    fn handle(&self, req: TypedHandlerRequest<UpdateDogRequest>) -> Result<Dog, ApiError> {
        let UpdateDogRequest { id, patch } = req.data;
        let dog = self
            .store
            .update(id, patch)
            .map_err(|e| ApiError::persistence("update dog", e))?
            .ok_or(ApiError::NotFound)?;
        info!(request_id = %req.request_id, dog_id = id, "Dog updated");
        Ok(dog)
    }
}
