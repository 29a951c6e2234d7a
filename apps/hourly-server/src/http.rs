//! The HTTP shell: liveness, OpenAPI, request ids, tracing and timeouts
//! around the routers contributed by the modules.

use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    http::{HeaderName, Request, Uri},
    middleware::{from_fn, Next},
    response::{Json, Response},
    routing::get,
    Router,
};
use modkit::{respond, Envelope, ErrDef, Operation, ProblemResponse, RestfulModule};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;
use utoipa::OpenApi;

pub const LIVENESS_MESSAGE: &str = "Hourly Server is Running!";

const ROUTE_NOT_FOUND: ErrDef = ErrDef::new(404, "Not Found", "ROUTE_NOT_FOUND");

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

#[derive(Clone, Default)]
struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Store the request id in the extensions and record it on the current span.
async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "n/a".to_string());

    req.extensions_mut().insert(XRequestId(rid.clone()));
    tracing::Span::current().record("request_id", tracing::field::display(&rid));

    next.run(req).await
}

fn make_span(req: &Request<Body>) -> tracing::Span {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri().path(),
        version = ?req.version(),
        request_id = %rid,
        status = Empty,
        latency_ms = Empty
    )
}

async fn liveness() -> Envelope<Value> {
    respond("Server", Operation::Get, Value::Null, Some(LIVENESS_MESSAGE))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn route_not_found(uri: Uri) -> ProblemResponse {
    ROUTE_NOT_FOUND.at(format!("No route for {}", uri.path()), uri.path())
}

/// Combined OpenAPI document of every module.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = users_info::api::rest::routes::UsersApiDoc::openapi();
    doc.merge(shifts::api::rest::routes::ShiftsApiDoc::openapi());
    doc.info.title = "Hourly API".to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc
}

/// Build the application router from the module routers.
pub fn build_router(modules: &[&dyn RestfulModule], timeout: Option<Duration>) -> Result<Router> {
    let doc = serde_json::to_value(openapi())?;

    let mut router = Router::new()
        .route("/", get(liveness))
        .route("/api", get(liveness))
        .route("/health", get(health_check))
        .route(
            "/api/openapi.json",
            get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        );

    for module in modules {
        router = module.register_rest(router)?;
    }
    router = router.fallback(route_not_found);

    if let Some(timeout) = timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    // Outermost first: set or propagate the id, expose it, then trace.
    let header = request_id_header();
    Ok(router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(header.clone(), MakeReqId))
            .layer(PropagateRequestIdLayer::new(header))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(from_fn(push_req_id_to_extensions)),
    ))
}
