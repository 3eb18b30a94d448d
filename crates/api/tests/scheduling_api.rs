//! HTTP-level tests for bookings, clients and invoices.
//!
//! Every route is tenant-scoped: rows of another organization behave as if
//! they did not exist.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_json_auth, seed_member, Member,
};
use photopro_db::models::user::{ROLE_ADMIN, ROLE_MEMBER};
use sqlx::PgPool;

fn booking_body(title: &str, hours_from_now: i64) -> serde_json::Value {
    let start = Utc::now() + Duration::hours(hours_from_now);
    serde_json::json!({
        "title": title,
        "start_time": start,
        "end_time": start + Duration::hours(1),
    })
}

async fn create_booking(pool: &PgPool, member: &Member, title: &str, hours: i64) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/bookings", &member.token, booking_body(title, hours)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn booking_defaults_to_pending(pool: PgPool) {
    let admin = seed_member(&pool, "book", "user_admin", ROLE_ADMIN).await;
    let id = create_booking(&pool, &admin, "Newborn", 24).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/bookings/{id}"), &admin.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Newborn");
    assert_eq!(json["data"]["status"], "pending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn booking_ending_before_start_is_rejected(pool: PgPool) {
    let admin = seed_member(&pool, "range", "user_admin", ROLE_ADMIN).await;
    let start = Utc::now() + Duration::hours(5);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/bookings",
        &admin.token,
        serde_json::json!({
            "title": "Backwards",
            "start_time": start,
            "end_time": start - Duration::hours(1),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_is_partial_and_status_can_change(pool: PgPool) {
    let admin = seed_member(&pool, "update", "user_admin", ROLE_ADMIN).await;
    let id = create_booking(&pool, &admin, "Original", 24).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/bookings/{id}"),
        &admin.token,
        serde_json::json!({ "location": "Studio B" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Original");
    assert_eq!(json["data"]["location"], "Studio B");

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/bookings/{id}/status"),
        &admin.token,
        serde_json::json!({ "status": "confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "confirmed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_window(pool: PgPool) {
    let admin = seed_member(&pool, "window", "user_admin", ROLE_ADMIN).await;
    create_booking(&pool, &admin, "Soon", 2).await;
    create_booking(&pool, &admin, "Later", 24 * 10).await;

    let to = (Utc::now() + Duration::days(1)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/bookings?to={to}"), &admin.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let bookings = json["data"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["title"], "Soon");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bookings_are_tenant_scoped(pool: PgPool) {
    let studio_a = seed_member(&pool, "studio-a", "user_a", ROLE_ADMIN).await;
    let studio_b = seed_member(&pool, "studio-b", "user_b", ROLE_ADMIN).await;
    let id = create_booking(&pool, &studio_a, "Private", 24).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/bookings/{id}"), &studio_b.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/bookings/{id}"), &studio_b.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/bookings", &studio_b.token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignee_from_another_org_is_rejected(pool: PgPool) {
    let studio_a = seed_member(&pool, "assign-a", "user_a", ROLE_ADMIN).await;
    let outsider = seed_member(&pool, "assign-b", "user_b", ROLE_MEMBER).await;

    let mut body = booking_body("Assigned", 24);
    body["assigned_user_id"] = serde_json::json!(outsider.user_id);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/bookings", &studio_a.token, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_crud(pool: PgPool) {
    let admin = seed_member(&pool, "clients", "user_admin", ROLE_ADMIN).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/clients",
        &admin.token,
        serde_json::json!({ "full_name": "Grace Hopper", "phone": "555-0100" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/clients/{id}"),
        &admin.token,
        serde_json::json!({ "email": "grace@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "grace@example.com");
    assert_eq!(json["data"]["phone"], "555-0100");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/clients/{id}"), &admin.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/clients/{id}"), &admin.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_with_invalid_email_is_rejected(pool: PgPool) {
    let admin = seed_member(&pool, "bad-email", "user_admin", ROLE_ADMIN).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/clients",
        &admin.token,
        serde_json::json!({ "full_name": "Nobody", "email": "not-an-email" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn invoice_can_only_be_sent_once(pool: PgPool) {
    let admin = seed_member(&pool, "send", "user_admin", ROLE_ADMIN).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/invoices",
        &admin.token,
        serde_json::json!({ "invoice_number": "INV-100", "total_cents": 2500 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "draft");
    let id = json["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/invoices/{id}/send"),
        &admin.token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "sent");

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/invoices/{id}/send"),
        &admin.token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_client_email_does_not_fail_send(pool: PgPool) {
    let admin = seed_member(&pool, "mailfail", "user_admin", ROLE_ADMIN).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/clients",
        &admin.token,
        serde_json::json!({ "full_name": "Grace Hopper", "email": "grace@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let client_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/invoices",
        &admin.token,
        serde_json::json!({ "invoice_number": "INV-200", "total_cents": 4000, "client_id": client_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app_with_mailer(pool.clone(), Some(common::unreachable_mailer()));
    let response = post_json_auth(
        app,
        &format!("/api/v1/invoices/{id}/send"),
        &admin.token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "sent");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/invoices/{id}"), &admin.token).await;
    assert_eq!(body_json(response).await["data"]["status"], "sent");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invoice_with_non_positive_total_is_rejected(pool: PgPool) {
    let admin = seed_member(&pool, "zero", "user_admin", ROLE_ADMIN).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/invoices",
        &admin.token,
        serde_json::json!({ "invoice_number": "INV-0", "total_cents": 0 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_invoice_number_is_conflict(pool: PgPool) {
    let admin = seed_member(&pool, "dupe-inv", "user_admin", ROLE_ADMIN).await;
    let body = serde_json::json!({ "invoice_number": "INV-7", "total_cents": 100 });

    let app = common::build_test_app(pool.clone());
    post_json_auth(app, "/api/v1/invoices", &admin.token, body.clone()).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/invoices", &admin.token, body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_for_unknown_user_is_unauthorized(pool: PgPool) {
    let token = photopro_api::auth::jwt::issue_token(
        "user_ghost",
        None,
        3600,
        &common::test_config().jwt,
    )
    .unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/clients", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_for_another_org_is_forbidden(pool: PgPool) {
    seed_member(&pool, "org-one", "user_one", ROLE_MEMBER).await;
    seed_member(&pool, "org-two", "user_two", ROLE_MEMBER).await;
    let token = photopro_api::auth::jwt::issue_token(
        "user_one",
        Some("org_org-two"),
        3600,
        &common::test_config().jwt,
    )
    .unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/clients", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
