use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::register, handlers::get_profile, handlers::list_users),
    components(schemas(dto::RegisterReq, dto::UserDto, dto::UserListDto, modkit::Problem, modkit::FieldError)),
    tags((name = "users", description = "User identities"))
)]
pub struct UsersApiDoc;

/// Mount the users_info endpoints onto `router`.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let users = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/profile", get(handlers::get_profile))
        .route("/api/users", get(handlers::list_users))
        .layer(Extension(service));

    Ok(router.merge(users))
}
