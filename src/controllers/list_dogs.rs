use crate::dispatcher::HandlerRequest;
use crate::error::ApiError;
use crate::model::{Dog, DogFilter};
use crate::store::DogStore;
use crate::typed::{Handler, TypedHandlerRequest};
use std::sync::Arc;

/// Query parameter holding the name substring.
pub const NAME_HAS_PARAM: &str = "nameHas";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDogsRequest {
    pub filter: DogFilter,
}

impl TryFrom<HandlerRequest> for ListDogsRequest {
    type Error = ApiError;

    fn try_from(req: HandlerRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            filter: DogFilter::name_has(req.get_query_param(NAME_HAS_PARAM)),
        })
    }
}

/// `GET /dogs[?nameHas=..]`
pub struct ListDogs {
    pub store: Arc<dyn DogStore>,
}

impl Handler for ListDogs {
    type Request = ListDogsRequest;
    type Response = Vec<Dog>;

    fn handle(&self, req: TypedHandlerRequest<ListDogsRequest>) -> Result<Vec<Dog>, ApiError> {
        Ok(self.store.find_many(&req.data.filter)?)
    }
}
