use super::DogIdRequest;
use crate::error::ApiError;
use crate::model::Dog;
use crate::store::DogStore;
use crate::typed::{Handler, TypedHandlerRequest};
use std::sync::Arc;
use tracing::info;

/// `DELETE /dogs/{id}`. Answers with the record that was removed.
pub struct DeleteDog {
    pub store: Arc<dyn DogStore>,
}

impl Handler for DeleteDog {
    type Request = DogIdRequest;
    type Response = Dog;

    fn handle(&self, req: TypedHandlerRequest<DogIdRequest>) -> Result<Dog, ApiError> {
        let id = req.data.id;
        let dog = self
            .store
            .delete(id)
            .map_err(|e| ApiError::persistence("delete dog", e))?
            .ok_or(ApiError::NotFound)?;
        info!(request_id = %req.request_id, dog_id = id, "Dog deleted");
        Ok(dog)
    }
}
