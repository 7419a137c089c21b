use super::DogIdRequest;
use crate::error::ApiError;
use crate::model::Dog;
use crate::store::DogStore;
use crate::typed::{Handler, TypedHandlerRequest};
use std::sync::Arc;

/// `GET /dogs/{id}`
pub struct GetDog {
    pub store: Arc<dyn DogStore>,
}

impl Handler for GetDog {
    type Request = DogIdRequest;
    type Response = Dog;

    fn handle(&self, req: TypedHandlerRequest<DogIdRequest>) -> Result<Dog, ApiError> {
        self.store
            .find_by_id(req.data.id)?
            .ok_or(ApiError::NotFound)
    }
}
