#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use photopro_api::auth::jwt::{issue_token, JwtConfig};
use photopro_api::config::{IntegrationSecrets, ServerConfig};
use photopro_api::routes;
use photopro_api::state::AppState;
use photopro_core::webhook_signature::sign_payload;
use photopro_db::models::organization::UpsertOrganization;
use photopro_db::models::user::UpsertUser;
use photopro_db::repositories::{OrganizationRepo, UserRepo};
use photopro_notifications::email::{EmailConfig, EmailDelivery};

pub const PAYMENT_SECRET: &str = "whsec_test_payments";
pub const IDENTITY_SECRET: &str = "whsec_test_identity";
pub const CRON_SECRET: &str = "cron-test-secret";
pub const PUBLIC_BASE_URL: &str = "https://api.test.local";
pub const APP_URL: &str = "https://app.test.local";

/// Build a test `ServerConfig` with fixed secrets and no SMTP.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: PUBLIC_BASE_URL.to_string(),
        app_url: Some(APP_URL.to_string()),
        reminder_interval_secs: 900,
        jwt: JwtConfig {
            secret: "test-jwt-secret-that-is-long-enough".to_string(),
            leeway_secs: 0,
        },
        secrets: IntegrationSecrets {
            payment_webhook_secret: PAYMENT_SECRET.to_string(),
            identity_webhook_secret: IDENTITY_SECRET.to_string(),
            cron_secret: CRON_SECRET.to_string(),
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Mirrors the router construction in `main.rs`. Email is disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mailer(pool, None)
}

/// Like [`build_test_app`], with the given SMTP delivery configured.
pub fn build_test_app_with_mailer(pool: PgPool, mailer: Option<Arc<EmailDelivery>>) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        mailer,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// SMTP delivery pointed at a closed local port; every send fails.
pub fn unreachable_mailer() -> Arc<EmailDelivery> {
    Arc::new(EmailDelivery::new(EmailConfig {
        smtp_host: "127.0.0.1".to_string(),
        smtp_port: 1,
        from_address: "Studio <noreply@example.com>".to_string(),
        smtp_user: None,
        smtp_password: None,
    }))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with an optional bearer token and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// POST a raw webhook body with a signature header computed for `secret`.
pub async fn signed_post(
    app: Router,
    uri: &str,
    header_name: &str,
    secret: &str,
    body: &serde_json::Value,
) -> Response {
    let payload = serde_json::to_vec(body).unwrap();
    let signature = sign_payload(secret, chrono::Utc::now().timestamp(), &payload);
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(header_name, signature)
        .body(Body::from(payload))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// A provisioned member with a valid session token.
pub struct Member {
    pub organization_id: i64,
    pub user_id: i64,
    pub token: String,
}

/// Provision an organization (idempotent per slug) and a member with `role`.
pub async fn seed_member(pool: &PgPool, org_slug: &str, user_external_id: &str, role: &str) -> Member {
    let org = OrganizationRepo::upsert(
        pool,
        &UpsertOrganization {
            external_id: format!("org_{org_slug}"),
            name: format!("Studio {org_slug}"),
            slug: org_slug.to_string(),
            timezone: None,
        },
    )
    .await
    .unwrap();

    let user = UserRepo::upsert(
        pool,
        &UpsertUser {
            external_id: user_external_id.to_string(),
            organization_id: org.id,
            email: format!("{user_external_id}@example.com"),
            full_name: None,
            role: role.to_string(),
        },
    )
    .await
    .unwrap();

    let token = issue_token(user_external_id, Some(&org.external_id), 3600, &test_config().jwt).unwrap();

    Member {
        organization_id: org.id,
        user_id: user.id,
        token,
    }
}
