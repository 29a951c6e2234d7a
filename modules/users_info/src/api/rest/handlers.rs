use std::sync::Arc;

use axum::{extract::Query, http::Uri, Extension};
use modkit::api::validation::validation_problem;
use modkit::{respond, Caller, Envelope, JsonBody, Operation, ProblemResponse};
use modkit_db::QueryParams;
use tracing::{error, info, warn};

use crate::api::rest::dto::{RegisterReq, UserDto, UserListDto};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

const ENTITY: &str = "User";

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "users",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered; `data` holds the user", body = UserDto),
        (status = 400, description = "Validation error", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 409, description = "Email already in use", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn register(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    JsonBody(req): JsonBody<RegisterReq>,
) -> Result<Envelope<UserDto>, ProblemResponse> {
    info!("Registering user");

    let new_user = req.validate(svc.config()).map_err(|errors| {
        warn!(violations = errors.len(), "Rejected registration payload");
        validation_problem(errors, uri.path())
    })?;

    match svc.register(new_user).await {
        Ok(user) => Ok(respond(
            ENTITY,
            Operation::Create,
            UserDto::from(user),
            Some("User registered successfully!"),
        )),
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Profile of the calling user
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "users",
    params(("x-user-email" = String, Header, description = "Verified email of the caller")),
    responses(
        (status = 200, description = "Caller profile; `data` holds the user", body = UserDto),
        (status = 401, description = "No identity on the request", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 403, description = "User is not active", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 404, description = "Unknown user", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_profile(
    uri: Uri,
    caller: Caller,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Envelope<UserDto>, ProblemResponse> {
    let Some(email) = caller.email() else {
        warn!("Profile requested without an identity");
        return Err(map_domain_error(
            &crate::domain::error::DomainError::MissingIdentity,
            uri.path(),
        ));
    };
    info!(email, "Getting profile");

    match svc.get_profile(email).await {
        Ok(user) => Ok(respond(ENTITY, Operation::Get, UserDto::from(user), None)),
        Err(e) => {
            error!("Failed to get profile: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(
        ("x-user-email" = String, Header, description = "Verified email of the caller"),
        ("sort_by" = Option<String>, Query, description = "Field to sort by; `-` prefix for descending"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "A page of users", body = UserListDto),
        (status = 400, description = "Invalid query", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 401, description = "No identity on the request", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_users(
    uri: Uri,
    caller: Caller,
    Extension(svc): Extension<Arc<Service>>,
    Query(params): Query<QueryParams>,
) -> Result<Envelope<UserListDto>, ProblemResponse> {
    info!("Listing users with query: {:?}", params);

    if let Err(e) = svc.resolve_active(caller.email()).await {
        warn!("Rejected user listing: {}", e);
        return Err(map_domain_error(&e, uri.path()));
    }

    match svc.list_users(params).await {
        Ok(page) => Ok(respond(
            ENTITY,
            Operation::Get,
            UserListDto::from(page),
            Some("Users retrieved successfully!"),
        )),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
