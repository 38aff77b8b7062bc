use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// JSON request body whose rejection renders as the API's error shape
///
/// A missing content type, malformed JSON and a body that does not match `T`
/// all become `400 {"error": "Invalid JSON body"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let rejection: JsonRejection = rejection;
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(AppError::bad_request("Invalid JSON body"))
            }
        }
    }
}
