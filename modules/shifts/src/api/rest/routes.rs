use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_shift,
        handlers::update_shift,
        handlers::delete_shift,
        handlers::list_user_shifts,
        handlers::list_all_shifts
    ),
    components(schemas(
        dto::CreateShiftReq,
        dto::UpdateShiftReq,
        dto::ShiftDto,
        dto::CreatedShiftsDto,
        dto::UserShiftsDto,
        dto::ShiftListDto,
        modkit::Problem,
        modkit::FieldError
    )),
    tags((name = "shifts", description = "Shift scheduling"))
)]
pub struct ShiftsApiDoc;

/// Mount the shifts endpoints onto `router`.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let shifts = Router::new()
        .route(
            "/api/shifts",
            post(handlers::create_shift).get(handlers::list_all_shifts),
        )
        .route("/api/shifts/user", get(handlers::list_user_shifts))
        .route(
            "/api/shifts/{id}",
            patch(handlers::update_shift).delete(handlers::delete_shift),
        )
        .layer(Extension(service));

    Ok(router.merge(shifts))
}
