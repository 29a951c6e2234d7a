use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use super::problem::{common, FieldError, ProblemResponse};

/// Collects field violations from a typed request validator so that a single
/// response can report every problem with the payload.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(path, message));
    }

    /// Record the error of a fallible check, keeping its value on success.
    pub fn check<T, E: std::fmt::Display>(
        &mut self,
        path: &str,
        res: Result<T, E>,
    ) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(path, e.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.0
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self.0)
        }
    }
}

/// One 400 problem listing every violation.
pub fn validation_problem(errors: Vec<FieldError>, instance: &str) -> ProblemResponse {
    let detail = match errors.len() {
        1 => "1 field failed validation".to_string(),
        n => format!("{n} fields failed validation"),
    };
    let mut resp = common::VALIDATION.at(detail, instance);
    resp.0.errors = Some(errors);
    resp
}

/// JSON body extractor whose rejections render as validation problems
/// instead of axum's plain-text errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_string();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(v)) => Ok(JsonBody(v)),
            Err(rejection) => Err(json_rejection_problem(&rejection, &instance)),
        }
    }
}

fn json_rejection_problem(rejection: &JsonRejection, instance: &str) -> ProblemResponse {
    tracing::debug!(error = %rejection, "rejected request body");
    let message = match rejection {
        JsonRejection::JsonDataError(e) => e.body_text(),
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        other => other.body_text(),
    };
    validation_problem(vec![FieldError::new("body", message)], instance)
}
