use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a handler did; drives the status code and the default message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn status(self) -> StatusCode {
        match self {
            Operation::Create => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Operation::Get => "retrieved",
            Operation::Create => "created",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
        }
    }

    /// `"<Entity> <verb> successfully!"`
    pub fn default_message(self, entity: &str) -> String {
        format!("{entity} {} successfully!", self.verb())
    }
}

/// Success body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(entity: &str, op: Operation, data: T, message: Option<&str>) -> Self {
        Self {
            success: true,
            status_code: op.status().as_u16(),
            message: message
                .map(str::to_owned)
                .unwrap_or_else(|| op.default_message(entity)),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Build the success envelope for `(entity, operation, payload, message?)`.
pub fn respond<T: Serialize>(
    entity: &str,
    op: Operation,
    data: T,
    message: Option<&str>,
) -> Envelope<T> {
    Envelope::new(entity, op, data, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_maps_to_201_with_default_message() {
        let env = respond("Shift", Operation::Create, serde_json::json!({"id": 1}), None);
        assert_eq!(env.status_code, 201);
        assert_eq!(env.message, "Shift created successfully!");
        assert!(env.success);

        let resp = env.into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[test]
    fn explicit_message_wins() {
        let env = respond("User", Operation::Get, 3, Some("Here you go"));
        assert_eq!(env.status_code, 200);
        assert_eq!(env.message, "Here you go");
    }

    #[test]
    fn every_operation_has_a_message() {
        for (op, verb) in [
            (Operation::Get, "retrieved"),
            (Operation::Update, "updated"),
            (Operation::Delete, "deleted"),
        ] {
            assert_eq!(op.status(), StatusCode::OK);
            assert_eq!(op.default_message("Shift"), format!("Shift {verb} successfully!"));
        }
    }
}
