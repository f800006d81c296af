//! Custom axum extractors for Parley

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::Error;

/// `Json<T>` that also runs `T::validate()` before the handler sees it.
///
/// Malformed bodies and failed validation are both answered with 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[derive(Debug)]
pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Validation(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let message = match self {
            ValidatedJsonRejection::Json(e) => e.body_text(),
            ValidatedJsonRejection::Validation(errors) => describe_validation_errors(&errors),
        };
        Error::Validation(message).into_response()
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value
            .validate()
            .map_err(ValidatedJsonRejection::Validation)?;
        Ok(ValidatedJson(value))
    }
}

/// One `field: message` entry per failed rule, sorted by field.
/// Rules without a custom message fall back to their code.
fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let reason = e.message.as_deref().unwrap_or(&e.code);
                format!("{}: {}", field, reason)
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
