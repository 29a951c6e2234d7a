use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::Uri,
    Extension,
};
use modkit::api::validation::validation_problem;
use modkit::{respond, Caller, Envelope, FieldError, JsonBody, Operation, ProblemResponse};
use modkit_db::QueryParams;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateShift, CreateShiftReq, CreatedShiftsDto, ShiftDto, ShiftListDto, UpdateShiftReq,
    UserShiftsDto,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

const ENTITY: &str = "Shift";

fn parse_id(raw: &str, instance: &str) -> Result<Uuid, ProblemResponse> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        warn!(id = raw, "Rejected malformed shift id");
        validation_problem(vec![FieldError::new("id", "Invalid shift id!")], instance)
    })
}

/// Create a shift for one date, or for every date of a range
#[utoipa::path(
    post,
    path = "/api/shifts",
    tag = "shifts",
    request_body = CreateShiftReq,
    params(("x-user-email" = String, Header, description = "Verified email of the caller")),
    responses(
        (status = 201, description = "Shift(s) created", body = CreatedShiftsDto),
        (status = 400, description = "Validation error or invalid break-time", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unknown or inactive caller", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 409, description = "Overlaps an existing shift", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_shift(
    uri: Uri,
    caller: Caller,
    Extension(svc): Extension<Arc<Service>>,
    JsonBody(req): JsonBody<CreateShiftReq>,
) -> Result<Envelope<CreatedShiftsDto>, ProblemResponse> {
    info!("Creating shift");

    let request = req.validate(svc.config()).map_err(|errors| {
        warn!(violations = errors.len(), "Rejected shift payload");
        validation_problem(errors, uri.path())
    })?;

    let created = match request {
        CreateShift::Single(new) => svc
            .create_shift(caller.email(), new)
            .await
            .map(|s| (CreatedShiftsDto::One(ShiftDto::from(s)), "Created new shift for the day!")),
        CreateShift::Bulk(new) => svc.create_bulk_shifts(caller.email(), new).await.map(|all| {
            (
                CreatedShiftsDto::Many(all.into_iter().map(ShiftDto::from).collect()),
                "Created new shifts for the date range!",
            )
        }),
    };

    match created {
        Ok((data, message)) => Ok(respond(ENTITY, Operation::Create, data, Some(message))),
        Err(e) => {
            error!("Failed to create shift: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update a shift owned by the caller
#[utoipa::path(
    patch,
    path = "/api/shifts/{id}",
    tag = "shifts",
    request_body = UpdateShiftReq,
    params(
        ("id" = String, Path, description = "Shift id"),
        ("x-user-email" = String, Header, description = "Verified email of the caller"),
    ),
    responses(
        (status = 200, description = "Updated shift", body = ShiftDto),
        (status = 400, description = "Validation error or invalid break-time", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 403, description = "Caller does not own the shift", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 404, description = "Unknown shift", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 409, description = "Overlaps an existing shift", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_shift(
    uri: Uri,
    caller: Caller,
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    JsonBody(req): JsonBody<UpdateShiftReq>,
) -> Result<Envelope<ShiftDto>, ProblemResponse> {
    let id = parse_id(&raw_id, uri.path())?;
    info!(shift_id = %id, "Updating shift");

    let patch = req.validate(svc.config()).map_err(|errors| {
        warn!(violations = errors.len(), "Rejected shift update payload");
        validation_problem(errors, uri.path())
    })?;

    match svc.update_shift(caller.email(), id, patch).await {
        Ok(shift) => Ok(respond(ENTITY, Operation::Update, ShiftDto::from(shift), None)),
        Err(e) => {
            error!("Failed to update shift: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a shift owned by the caller
#[utoipa::path(
    delete,
    path = "/api/shifts/{id}",
    tag = "shifts",
    params(
        ("id" = String, Path, description = "Shift id"),
        ("x-user-email" = String, Header, description = "Verified email of the caller"),
    ),
    responses(
        (status = 200, description = "Deleted shift", body = ShiftDto),
        (status = 403, description = "Caller does not own the shift", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 404, description = "Unknown shift", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_shift(
    uri: Uri,
    caller: Caller,
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Envelope<ShiftDto>, ProblemResponse> {
    let id = parse_id(&raw_id, uri.path())?;
    info!(shift_id = %id, "Deleting shift");

    match svc.delete_shift(caller.email(), id).await {
        Ok(shift) => Ok(respond(ENTITY, Operation::Delete, ShiftDto::from(shift), None)),
        Err(e) => {
            error!("Failed to delete shift: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// The caller's shifts with break and working totals
#[utoipa::path(
    get,
    path = "/api/shifts/user",
    tag = "shifts",
    params(
        ("x-user-email" = String, Header, description = "Verified email of the caller"),
        ("sort_by" = Option<String>, Query, description = "Field to sort by; `-` prefix for descending"),
        ("date_from" = Option<String>, Query, description = "Earliest date, inclusive"),
        ("date_to" = Option<String>, Query, description = "Latest date, inclusive"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "A page of shifts and totals", body = UserShiftsDto),
        (status = 400, description = "Invalid query", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unknown or inactive caller", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_user_shifts(
    uri: Uri,
    caller: Caller,
    Extension(svc): Extension<Arc<Service>>,
    Query(params): Query<QueryParams>,
) -> Result<Envelope<UserShiftsDto>, ProblemResponse> {
    info!("Listing caller shifts with query: {:?}", params);

    match svc.list_user_shifts(caller.email(), params).await {
        Ok(summary) => Ok(respond(
            ENTITY,
            Operation::Get,
            UserShiftsDto::from(summary),
            Some("Shifts retrieved successfully!"),
        )),
        Err(e) => {
            error!("Failed to list caller shifts: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Every user's shifts; admins only
#[utoipa::path(
    get,
    path = "/api/shifts",
    tag = "shifts",
    params(
        ("x-user-email" = String, Header, description = "Verified email of an admin"),
        ("user_id" = Option<String>, Query, description = "Only shifts of this user"),
        ("sort_by" = Option<String>, Query, description = "Field to sort by; `-` prefix for descending"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "A page of shifts", body = ShiftListDto),
        (status = 400, description = "Invalid query", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unknown or inactive caller", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 403, description = "Caller is not an admin", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_all_shifts(
    uri: Uri,
    caller: Caller,
    Extension(svc): Extension<Arc<Service>>,
    Query(params): Query<QueryParams>,
) -> Result<Envelope<ShiftListDto>, ProblemResponse> {
    info!("Listing all shifts with query: {:?}", params);

    match svc.list_all_shifts(caller.email(), params).await {
        Ok(page) => Ok(respond(
            ENTITY,
            Operation::Get,
            ShiftListDto::from(page),
            Some("Shifts retrieved successfully!"),
        )),
        Err(e) => {
            error!("Failed to list all shifts: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
