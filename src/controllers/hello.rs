use crate::dispatcher::HandlerRequest;
use crate::error::ApiError;
use crate::typed::{Handler, TypedHandlerRequest};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct HelloRequest;

impl TryFrom<HandlerRequest> for HelloRequest {
    type Error = ApiError;

    fn try_from(_req: HandlerRequest) -> Result<Self, Self::Error> {
        Ok(HelloRequest)
    }
}

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
}

/// `GET /`: a liveness greeting.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hello;

impl Handler for Hello {
    type Request = HelloRequest;
    type Response = HelloResponse;

    fn handle(&self, _req: TypedHandlerRequest<HelloRequest>) -> Result<HelloResponse, ApiError> {
        Ok(HelloResponse {
            message: "Hello World!",
        })
    }
}
