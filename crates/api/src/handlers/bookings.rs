//! Handlers for bookings.
//!
//! All endpoints require authentication via [`AuthUser`] and are scoped to
//! the caller's organization.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photopro_core::booking::{validate_time_range, validate_title, BookingStatus};
use photopro_core::error::CoreError;
use photopro_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use photopro_core::types::{DbId, Timestamp};
use photopro_db::models::booking::{BookingFilter, CreateBooking, UpdateBooking, UpdateBookingStatus};
use photopro_db::repositories::{BookingRepo, ClientRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /bookings`.
#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    /// Only bookings starting at or after this time.
    pub from: Option<Timestamp>,
    /// Only bookings starting at or before this time.
    pub to: Option<Timestamp>,
    pub status: Option<BookingStatus>,
    pub assigned_user_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/bookings
pub async fn list_bookings(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BookingListParams>,
) -> AppResult<impl IntoResponse> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if to < from {
            return Err(AppError::BadRequest("'to' must not be before 'from'".into()));
        }
    }

    let filter = BookingFilter {
        from: params.from,
        to: params.to,
        status: params.status,
        assigned_user_id: params.assigned_user_id,
        limit: clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        offset: clamp_offset(params.offset),
    };
    let bookings = BookingRepo::list(&state.pool, auth.organization_id, &filter).await?;

    Ok(Json(DataResponse { data: bookings }))
}

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingRepo::find(&state.pool, auth.organization_id, booking_id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking", booking_id))?;

    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings
pub async fn create_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBooking>,
) -> AppResult<impl IntoResponse> {
    validate_title(&input.title)?;
    validate_time_range(input.start_time, input.end_time)?;
    ensure_references(&state, &auth, input.client_id, input.assigned_user_id).await?;

    let booking = BookingRepo::create(&state.pool, auth.organization_id, &input).await?;

    tracing::info!(
        booking_id = booking.id,
        organization_id = auth.organization_id,
        user_id = auth.user_id,
        status = %booking.status,
        "Booking created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// PUT /api/v1/bookings/{id}
///
/// Partial update; omitted fields keep their current values. The resulting
/// time range is validated against the stored one.
pub async fn update_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<UpdateBooking>,
) -> AppResult<impl IntoResponse> {
    let existing = BookingRepo::find(&state.pool, auth.organization_id, booking_id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking", booking_id))?;

    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    validate_time_range(
        input.start_time.unwrap_or(existing.start_time),
        input.end_time.unwrap_or(existing.end_time),
    )?;
    ensure_references(&state, &auth, input.client_id, input.assigned_user_id).await?;

    let booking = BookingRepo::update(&state.pool, auth.organization_id, booking_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Booking", booking_id))?;

    tracing::info!(booking_id, user_id = auth.user_id, "Booking updated");

    Ok(Json(DataResponse { data: booking }))
}

/// PUT /api/v1/bookings/{id}/status
pub async fn update_booking_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<UpdateBookingStatus>,
) -> AppResult<impl IntoResponse> {
    let booking =
        BookingRepo::set_status(&state.pool, auth.organization_id, booking_id, input.status)
            .await?
            .ok_or_else(|| AppError::not_found("Booking", booking_id))?;

    tracing::info!(
        booking_id,
        user_id = auth.user_id,
        status = %input.status,
        "Booking status changed",
    );

    Ok(Json(DataResponse { data: booking }))
}

/// DELETE /api/v1/bookings/{id}
pub async fn delete_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !BookingRepo::delete(&state.pool, auth.organization_id, booking_id).await? {
        return Err(AppError::not_found("Booking", booking_id));
    }

    tracing::info!(booking_id, user_id = auth.user_id, "Booking deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Reject client or assignee ids that do not belong to the caller's organization.
async fn ensure_references(
    state: &AppState,
    auth: &AuthUser,
    client_id: Option<DbId>,
    assigned_user_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(client_id) = client_id {
        if ClientRepo::find(&state.pool, auth.organization_id, client_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Client {client_id} does not exist"
            ))));
        }
    }
    if let Some(user_id) = assigned_user_id {
        if UserRepo::find_in_org(&state.pool, auth.organization_id, user_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "User {user_id} is not a member of this organization"
            ))));
        }
    }
    Ok(())
}
