use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::error::{ApiError, ErrorPolicy};
use crate::ids::RequestId;
use crate::router::ParamVec;
use http::Method;
use serde::Serialize;
use std::convert::TryFrom;

/// Trait implemented by typed coroutine handlers.
pub trait Handler: Send + 'static {
    /// Built from the raw request; a conversion error is answered directly.
    type Request: TryFrom<HandlerRequest, Error = ApiError> + Send + 'static;
    /// Serialized to JSON on success.
    type Response: Serialize + Send + 'static;

    /// Status sent with a successful response.
    const SUCCESS_STATUS: u16 = 200;

    fn handle(&self, req: TypedHandlerRequest<Self::Request>) -> Result<Self::Response, ApiError>;
}

/// Request metadata plus the converted request data.
#[derive(Debug, Clone)]
pub struct TypedHandlerRequest<T> {
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub data: T,
}

impl<T> TypedHandlerRequest<T>
where
    T: TryFrom<HandlerRequest, Error = ApiError>,
{
    /// Convert a raw request, running `T`'s parsing and validation.
    ///
    /// # Errors
    ///
    /// Whatever `T::try_from` rejects the request with.
    pub fn from_handler(req: HandlerRequest) -> Result<Self, ApiError> {
        let request_id = req.request_id;
        let method = req.method.clone();
        let path = req.path.clone();
        let handler_name = req.handler_name.clone();
        let path_params = req.path_params.clone();
        let query_params = req.query_params.clone();
        // Body and headers move into the conversion.
        let data = T::try_from(req)?;
        Ok(TypedHandlerRequest {
            request_id,
            method,
            path,
            handler_name,
            path_params,
            query_params,
            data,
        })
    }
}

/// Run `handler` against a raw request and render the outcome.
pub fn respond<H: Handler>(handler: &H, req: HandlerRequest, policy: &ErrorPolicy) -> HandlerResponse {
    let outcome = TypedHandlerRequest::<H::Request>::from_handler(req)
        .and_then(|typed| handler.handle(typed))
        .and_then(|body| {
            serde_json::to_value(body)
                .map_err(|e| ApiError::Internal(format!("failed to serialize response: {e}")))
        });
    match outcome {
        Ok(body) => HandlerResponse::json(H::SUCCESS_STATUS, body),
        Err(err) => err.into_response(policy),
    }
}

impl Dispatcher {
    /// Register a typed handler under `name`.
    ///
    /// Errors are rendered with the policy in effect at registration time.
    ///
    /// # Safety
    ///
    /// Same requirements as [`Dispatcher::register_handler`].
    pub unsafe fn register_typed<H>(&mut self, name: &str, handler: H)
    where
        H: Handler,
    {
        let policy = self.error_policy();
        // SAFETY: forwarded to the caller.
        unsafe {
            self.register_handler(name, move |req: HandlerRequest| {
                let reply_tx = req.reply_tx.clone();
                let _ = reply_tx.send(respond(&handler, req, &policy));
            });
        }
    }
}
