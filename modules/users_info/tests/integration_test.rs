use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use modkit::{DbModule, RestfulModule};
use modkit_db::{ConnectOpts, DbHandle, QueryParams};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use serde_json::{json, Value};
use tower::ServiceExt;

use users_info::{
    config::UsersInfoConfig,
    contract::{client::UsersInfoApi, error::UsersInfoError, model::NewUser},
    domain::error::DomainError,
    domain::service::Service,
    UsersInfo,
};

/// Fresh in-memory database with the users table migrated.
async fn create_test_module() -> (DbHandle, UsersInfo) {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    let module = UsersInfo::new(db.sea(), &UsersInfoConfig::default());
    module.migrate(&db).await.expect("Failed to run migrations");
    (db, module)
}

async fn create_test_service() -> (DbHandle, Arc<Service>) {
    let (db, module) = create_test_module().await;
    (db, module.service())
}

async fn create_test_router() -> (DbHandle, Router) {
    let (db, module) = create_test_module().await;
    let router = module
        .register_rest(Router::new())
        .expect("Failed to register routes");
    (db, router)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password: "secret123".to_string(),
    }
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_derives_user_names_and_hashes_passwords() -> Result<()> {
    let (db, service) = create_test_service().await;

    let alice = service.register(new_user("Alice@Example.com")).await?;
    assert_eq!(alice.email, "alice@example.com");
    assert_eq!(alice.user_name, "alice");
    assert!(alice.is_active);
    assert_eq!(alice.role.as_str(), "user");

    let second = service.register(new_user("alice@work.io")).await?;
    let third = service.register(new_user("alice@home.io")).await?;
    assert_eq!(second.user_name, "alice1");
    assert_eq!(third.user_name, "alice2");

    let row = db
        .seaorm()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM users WHERE email = ?",
            ["alice@example.com".into()],
        ))
        .await?
        .expect("row exists");
    let hash: String = row.try_get("", "password_hash")?;
    assert!(hash.starts_with("$argon2"));
    assert_ne!(hash, "secret123");
    Ok(())
}

#[tokio::test]
async fn register_rejects_existing_email() -> Result<()> {
    let (_db, service) = create_test_service().await;
    service.register(new_user("bob@example.com")).await?;

    let err = service
        .register(new_user("BOB@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));
    Ok(())
}

#[tokio::test]
async fn resolve_active_distinguishes_failures() -> Result<()> {
    let (db, service) = create_test_service().await;
    service.register(new_user("carol@example.com")).await?;

    let user = service.resolve_active(Some(" Carol@Example.com ")).await?;
    assert_eq!(user.user_name, "carol");

    assert!(matches!(
        service.resolve_active(None).await,
        Err(DomainError::MissingIdentity)
    ));
    assert!(matches!(
        service.resolve_active(Some("   ")).await,
        Err(DomainError::MissingIdentity)
    ));
    assert!(matches!(
        service.resolve_active(Some("dave@example.com")).await,
        Err(DomainError::UserNotFound { .. })
    ));

    db.seaorm()
        .execute_unprepared("UPDATE users SET is_active = false WHERE email = 'carol@example.com'")
        .await?;
    let err = service
        .resolve_active(Some("carol@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User with email carol@example.com is not active!");
    Ok(())
}

#[tokio::test]
async fn list_users_filters_sorts_and_pages() -> Result<()> {
    let (_db, service) = create_test_service().await;
    for email in ["a@x.io", "b@x.io", "c@x.io", "d@x.io"] {
        service.register(new_user(email)).await?;
    }

    let page = service
        .list_users(
            QueryParams::new()
                .with("sort_by", "user_name")
                .with("limit", "3"),
        )
        .await?;
    let names: Vec<&str> = page.items.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(page.page_info.total, 4);

    let page = service
        .list_users(QueryParams::new().with("email", "d@x.io"))
        .await?;
    assert_eq!(page.items.len(), 1);

    let err = service
        .list_users(QueryParams::new().with("sort_by", "password_hash"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidQuery { .. }));
    Ok(())
}

#[tokio::test]
async fn local_client_projects_errors() -> Result<()> {
    let (_db, module) = create_test_module().await;
    let client: Arc<dyn UsersInfoApi> = module.client();

    client.register(new_user("erin@example.com")).await?;
    let err = client.get_profile("nobody@example.com").await.unwrap_err();
    assert_eq!(
        err,
        UsersInfoError::NotFound {
            email: "nobody@example.com".into()
        }
    );
    assert_eq!(
        client.resolve_active(None).await.unwrap_err(),
        UsersInfoError::MissingIdentity
    );
    Ok(())
}

#[tokio::test]
async fn rest_register_and_profile() -> Result<()> {
    let (_db, router) = create_test_router().await;

    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "email": "frank@example.com", "password": "secret123" }).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["message"], "User registered successfully!");
    assert_eq!(body["data"]["user_name"], "frank");
    assert!(body["data"].get("password_hash").is_none());

    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .header("x-user-email", "frank@example.com")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["email"], "frank@example.com");

    let resp = router
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers()["content-type"],
        "application/problem+json"
    );
    Ok(())
}

#[tokio::test]
async fn rest_register_batches_validation_errors() -> Result<()> {
    let (_db, router) = create_test_router().await;

    let resp = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "email": "nope", "password": "123" }).to_string()))?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["instance"], "/api/auth/register");
    let paths: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["email", "password"]);
    Ok(())
}

#[tokio::test]
async fn rest_duplicate_email_is_conflict() -> Result<()> {
    let (_db, router) = create_test_router().await;
    let register = || {
        Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "email": "gina@example.com", "password": "secret123" }).to_string(),
            ))
            .unwrap()
    };

    let first = router.clone().oneshot(register()).await?;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = router.oneshot(register()).await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["code"], "USERS_EMAIL_CONFLICT");
    assert_eq!(body["errors"][0]["path"], "email");
    Ok(())
}

#[tokio::test]
async fn rest_list_requires_identity() -> Result<()> {
    let (_db, router) = create_test_router().await;
    let resp = router
        .clone()
        .oneshot(Request::builder().uri("/api/users").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = router
        .oneshot(
            Request::builder()
                .uri("/api/users?sort_by=-email")
                .header("x-user-email", "ghost@example.com")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}
