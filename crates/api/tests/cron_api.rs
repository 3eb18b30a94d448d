//! HTTP-level tests for the scheduler-triggered job endpoints.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, post_json_auth, seed_member, send, CRON_SECRET};
use photopro_db::models::user::ROLE_ADMIN;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn cron_requires_secret(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = send(app, Method::POST, "/api/v1/cron/booking-reminders", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = send(
        app,
        Method::POST,
        "/api/v1/cron/invoice-overdue",
        Some("not-the-secret"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reminder_run_claims_due_bookings_once(pool: PgPool) {
    let admin = seed_member(&pool, "cron-remind", "user_admin", ROLE_ADMIN).await;
    let start = Utc::now() + Duration::hours(20);
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/bookings",
        &admin.token,
        serde_json::json!({
            "title": "Family session",
            "start_time": start,
            "end_time": start + Duration::hours(1),
            "status": "confirmed",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = send(
        app,
        Method::POST,
        "/api/v1/cron/booking-reminders",
        Some(CRON_SECRET),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["data"]["claimed"], 1);
    // No SMTP in tests: claimed reminders are counted as skipped.
    assert_eq!(first["data"]["skipped"], 1);
    assert_eq!(first["data"]["emailed"], 0);

    let app = common::build_test_app(pool);
    let response = send(
        app,
        Method::POST,
        "/api/v1/cron/booking-reminders",
        Some(CRON_SECRET),
        None,
    )
    .await;
    let second = body_json(response).await;
    assert_eq!(second["data"]["claimed"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overdue_run_flips_past_due_invoices(pool: PgPool) {
    let admin = seed_member(&pool, "cron-overdue", "user_admin", ROLE_ADMIN).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/invoices",
        &admin.token,
        serde_json::json!({
            "invoice_number": "INV-LATE",
            "total_cents": 12000,
            "due_date": Utc::now() - Duration::days(3),
        }),
    )
    .await;
    let invoice_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = send(
        app,
        Method::POST,
        &format!("/api/v1/invoices/{invoice_id}/send"),
        Some(&admin.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = send(
        app,
        Method::POST,
        "/api/v1/cron/invoice-overdue",
        Some(CRON_SECRET),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["flipped"], 1);

    let app = common::build_test_app(pool);
    let response = send(
        app,
        Method::POST,
        "/api/v1/cron/invoice-overdue",
        Some(CRON_SECRET),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["flipped"], 0);
}
