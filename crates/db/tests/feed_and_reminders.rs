//! Integration tests for the calendar feed and reminder queries.
//!
//! Exercises the repository layer against a real database:
//! - Feed window and cancelled-booking exclusion
//! - Personal (user-scoped) feeds
//! - Token access recording and deactivation
//! - Reminder claim idempotency

use chrono::{Duration, Utc};
use photopro_core::booking::BookingStatus;
use photopro_core::reminders::ReminderKind;
use photopro_db::models::booking::{CreateBooking, UpdateBooking};
use photopro_db::models::client::CreateClient;
use photopro_db::models::organization::UpsertOrganization;
use photopro_db::models::user::{UpsertUser, ROLE_MEMBER};
use photopro_db::repositories::{
    BookingReminderRepo, BookingRepo, CalendarFeedRepo, ClientRepo, OrganizationRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_org(pool: &PgPool, slug: &str) -> i64 {
    OrganizationRepo::upsert(
        pool,
        &UpsertOrganization {
            external_id: format!("org_{slug}"),
            name: format!("Studio {slug}"),
            slug: slug.to_string(),
            timezone: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_user(pool: &PgPool, org_id: i64, external_id: &str) -> i64 {
    UserRepo::upsert(
        pool,
        &UpsertUser {
            external_id: external_id.to_string(),
            organization_id: org_id,
            email: format!("{external_id}@example.com"),
            full_name: None,
            role: ROLE_MEMBER.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn booking_at(title: &str, hours_from_now: i64, status: BookingStatus) -> CreateBooking {
    let start = Utc::now() + Duration::hours(hours_from_now);
    CreateBooking {
        client_id: None,
        assigned_user_id: None,
        title: title.to_string(),
        description: None,
        location: None,
        start_time: start,
        end_time: start + Duration::hours(1),
        status: Some(status),
    }
}

// ---------------------------------------------------------------------------
// Feed queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_excludes_cancelled_and_out_of_window(pool: PgPool) {
    let org = seed_org(&pool, "feed-window").await;
    let confirmed = BookingRepo::create(&pool, org, &booking_at("Confirmed", 48, BookingStatus::Confirmed))
        .await
        .unwrap();
    let no_show = BookingRepo::create(&pool, org, &booking_at("No show", -48, BookingStatus::NoShow))
        .await
        .unwrap();
    BookingRepo::create(&pool, org, &booking_at("Cancelled", 24, BookingStatus::Cancelled))
        .await
        .unwrap();
    BookingRepo::create(&pool, org, &booking_at("Too old", -24 * 31, BookingStatus::Completed))
        .await
        .unwrap();
    BookingRepo::create(&pool, org, &booking_at("Too far", 24 * 366, BookingStatus::Pending))
        .await
        .unwrap();

    let (from, to) = photopro_core::calendar_feed::feed_window(Utc::now());
    let rows = BookingRepo::list_for_feed(&pool, org, None, from, to).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    assert_eq!(ids, vec![no_show.id, confirmed.id], "ordered by start time");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_is_tenant_scoped(pool: PgPool) {
    let org_a = seed_org(&pool, "tenant-a").await;
    let org_b = seed_org(&pool, "tenant-b").await;
    BookingRepo::create(&pool, org_b, &booking_at("Other tenant", 5, BookingStatus::Confirmed))
        .await
        .unwrap();

    let (from, to) = photopro_core::calendar_feed::feed_window(Utc::now());
    let rows = BookingRepo::list_for_feed(&pool, org_a, None, from, to).await.unwrap();
    assert!(rows.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn personal_feed_only_includes_assigned_bookings(pool: PgPool) {
    let org = seed_org(&pool, "personal").await;
    let alice = seed_user(&pool, org, "user_alice").await;
    let bob = seed_user(&pool, org, "user_bob").await;

    let mut mine = booking_at("Alice shoot", 10, BookingStatus::Confirmed);
    mine.assigned_user_id = Some(alice);
    let mine = BookingRepo::create(&pool, org, &mine).await.unwrap();

    let mut theirs = booking_at("Bob shoot", 12, BookingStatus::Confirmed);
    theirs.assigned_user_id = Some(bob);
    BookingRepo::create(&pool, org, &theirs).await.unwrap();

    let (from, to) = photopro_core::calendar_feed::feed_window(Utc::now());
    let rows = BookingRepo::list_for_feed(&pool, org, Some(alice), from, to)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, mine.id);

    let all = BookingRepo::list_for_feed(&pool, org, None, from, to).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_rows_carry_client_contact(pool: PgPool) {
    let org = seed_org(&pool, "contact").await;
    let client = ClientRepo::create(
        &pool,
        org,
        &CreateClient {
            full_name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: Some("555-0100".to_string()),
        },
    )
    .await
    .unwrap();

    let mut input = booking_at("Portraits", 3, BookingStatus::Pending);
    input.client_id = Some(client.id);
    BookingRepo::create(&pool, org, &input).await.unwrap();

    let (from, to) = photopro_core::calendar_feed::feed_window(Utc::now());
    let rows = BookingRepo::list_for_feed(&pool, org, None, from, to).await.unwrap();
    assert_eq!(rows[0].client_name.as_deref(), Some("Jane Doe"));
    assert_eq!(rows[0].client_email.as_deref(), Some("jane@example.com"));
    assert_eq!(rows[0].client_phone.as_deref(), Some("555-0100"));
}

// ---------------------------------------------------------------------------
// Feed tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn access_by_token_records_last_access(pool: PgPool) {
    let org = seed_org(&pool, "tokens").await;
    let feed = CalendarFeedRepo::create(&pool, org, None, "tok123", "Bookings", "UTC")
        .await
        .unwrap();
    assert!(feed.last_accessed_at.is_none());

    let first_at = Utc::now();
    let first = CalendarFeedRepo::access_by_token(&pool, "tok123", first_at)
        .await
        .unwrap()
        .expect("active token resolves");
    assert_eq!(first.id, feed.id);
    assert!(first.last_accessed_at.is_some());

    let second_at = first_at + Duration::seconds(30);
    let second = CalendarFeedRepo::access_by_token(&pool, "tok123", second_at)
        .await
        .unwrap()
        .unwrap();
    assert!(second.last_accessed_at.unwrap() > first.last_accessed_at.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactive_and_unknown_tokens_do_not_resolve(pool: PgPool) {
    let org = seed_org(&pool, "inactive").await;
    let feed = CalendarFeedRepo::create(&pool, org, None, "tokoff", "Bookings", "UTC")
        .await
        .unwrap();
    CalendarFeedRepo::deactivate(&pool, org, feed.id).await.unwrap();

    assert!(CalendarFeedRepo::access_by_token(&pool, "tokoff", Utc::now())
        .await
        .unwrap()
        .is_none());
    assert!(CalendarFeedRepo::access_by_token(&pool, "nope", Utc::now())
        .await
        .unwrap()
        .is_none());

    let reloaded = CalendarFeedRepo::find(&pool, org, feed.id).await.unwrap().unwrap();
    assert!(reloaded.last_accessed_at.is_none(), "rejected access is not recorded");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn regenerate_invalidates_old_token(pool: PgPool) {
    let org = seed_org(&pool, "regen").await;
    let feed = CalendarFeedRepo::create(&pool, org, None, "oldtok", "Bookings", "UTC")
        .await
        .unwrap();
    CalendarFeedRepo::regenerate_token(&pool, org, feed.id, "newtok")
        .await
        .unwrap()
        .unwrap();

    assert!(CalendarFeedRepo::access_by_token(&pool, "oldtok", Utc::now())
        .await
        .unwrap()
        .is_none());
    assert!(CalendarFeedRepo::access_by_token(&pool, "newtok", Utc::now())
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_token_is_a_unique_violation(pool: PgPool) {
    let org = seed_org(&pool, "dupe").await;
    CalendarFeedRepo::create(&pool, org, None, "same", "A", "UTC")
        .await
        .unwrap();
    let err = CalendarFeedRepo::create(&pool, org, None, "same", "B", "UTC")
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_calendar_feeds_token"));
        }
        other => panic!("expected database error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_keeps_unspecified_fields(pool: PgPool) {
    let org = seed_org(&pool, "update").await;
    let mut input = booking_at("Original", 6, BookingStatus::Pending);
    input.location = Some("Park".to_string());
    let booking = BookingRepo::create(&pool, org, &input).await.unwrap();

    let updated = BookingRepo::update(
        &pool,
        org,
        booking.id,
        &UpdateBooking {
            title: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.location.as_deref(), Some("Park"));
    assert_eq!(updated.start_time, booking.start_time);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_before_start_violates_check_constraint(pool: PgPool) {
    let org = seed_org(&pool, "check").await;
    let mut input = booking_at("Backwards", 6, BookingStatus::Pending);
    input.end_time = input.start_time - Duration::minutes(1);
    assert!(BookingRepo::create(&pool, org, &input).await.is_err());
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reminder_claim_is_idempotent(pool: PgPool) {
    let org = seed_org(&pool, "remind").await;
    let booking = BookingRepo::create(&pool, org, &booking_at("Soon", 5, BookingStatus::Confirmed))
        .await
        .unwrap();

    assert!(BookingReminderRepo::claim(&pool, booking.id, ReminderKind::DayBefore, None)
        .await
        .unwrap());
    assert!(!BookingReminderRepo::claim(&pool, booking.id, ReminderKind::DayBefore, None)
        .await
        .unwrap());
    assert!(BookingReminderRepo::claim(&pool, booking.id, ReminderKind::HourBefore, None)
        .await
        .unwrap());

    let sent = BookingReminderRepo::list_for_booking(&pool, booking.id).await.unwrap();
    assert_eq!(sent.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn due_query_skips_claimed_and_closed_bookings(pool: PgPool) {
    let org = seed_org(&pool, "due").await;
    let open = BookingRepo::create(&pool, org, &booking_at("Open", 5, BookingStatus::Confirmed))
        .await
        .unwrap();
    let claimed = BookingRepo::create(&pool, org, &booking_at("Claimed", 6, BookingStatus::Pending))
        .await
        .unwrap();
    BookingRepo::create(&pool, org, &booking_at("Done", 7, BookingStatus::Completed))
        .await
        .unwrap();
    BookingReminderRepo::claim(&pool, claimed.id, ReminderKind::DayBefore, None)
        .await
        .unwrap();

    let (after, until) = ReminderKind::DayBefore.due_window(Utc::now());
    let due = BookingRepo::list_due_for_reminder(&pool, "day_before", after, until, 100)
        .await
        .unwrap();
    let ids: Vec<i64> = due.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![open.id]);
}
