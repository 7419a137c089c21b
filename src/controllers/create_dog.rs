use crate::dispatcher::HandlerRequest;
use crate::error::ApiError;
use crate::model::{Dog, NewDog};
use crate::store::DogStore;
use crate::typed::{Handler, TypedHandlerRequest};
use crate::validation::validate_create;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDogRequest {
    pub dog: NewDog,
}

impl TryFrom<HandlerRequest> for CreateDogRequest {
    type Error = ApiError;

    fn try_from(req: HandlerRequest) -> Result<Self, Self::Error> {
        let dog = validate_create(req.body.as_ref()).map_err(ApiError::Validation)?;
        Ok(Self { dog })
    }
}

/// `POST /dogs`
pub struct CreateDog {
    pub store: Arc<dyn DogStore>,
}

impl Handler for CreateDog {
    type Request = CreateDogRequest;
    type Response = Dog;

    const SUCCESS_STATUS: u16 = 201;

    fn handle(&self, req: TypedHandlerRequest<CreateDogRequest>) -> Result<Dog, ApiError> {
        let dog = self
            .store
            .create(req.data.dog)
            .map_err(|e| ApiError::persistence("create dog", e))?;
        info!(request_id = %req.request_id, dog_id = dog.id, "Dog created");
        Ok(dog)
    }
}
