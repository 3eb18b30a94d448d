//! Handlers for the studio's client directory.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photopro_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use photopro_core::types::DbId;
use photopro_db::models::client::{CreateClient, UpdateClient};
use photopro_db::repositories::ClientRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/clients
pub async fn list_clients(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let clients = ClientRepo::list(&state.pool, auth.organization_id, limit, offset).await?;

    Ok(Json(DataResponse { data: clients }))
}

/// GET /api/v1/clients/{id}
pub async fn get_client(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let client = ClientRepo::find(&state.pool, auth.organization_id, client_id)
        .await?
        .ok_or_else(|| AppError::not_found("Client", client_id))?;

    Ok(Json(DataResponse { data: client }))
}

/// POST /api/v1/clients
pub async fn create_client(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateClient>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let client = ClientRepo::create(&state.pool, auth.organization_id, &input).await?;

    tracing::info!(
        client_id = client.id,
        organization_id = auth.organization_id,
        user_id = auth.user_id,
        "Client created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: client })))
}

/// PUT /api/v1/clients/{id}
pub async fn update_client(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
    Json(input): Json<UpdateClient>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let client = ClientRepo::update(&state.pool, auth.organization_id, client_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Client", client_id))?;

    tracing::info!(client_id, user_id = auth.user_id, "Client updated");

    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/v1/clients/{id}
pub async fn delete_client(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ClientRepo::delete(&state.pool, auth.organization_id, client_id).await? {
        return Err(AppError::not_found("Client", client_id));
    }

    tracing::info!(client_id, user_id = auth.user_id, "Client deleted");

    Ok(StatusCode::NO_CONTENT)
}
