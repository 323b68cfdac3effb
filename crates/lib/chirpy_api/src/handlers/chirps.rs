//! Chirp request handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chirpy_core::auth::policy::authorize_owner;
use chirpy_core::models::chirp::SortOrder;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ChirpResponse, CreateChirpRequest, ListChirpsQuery};
use crate::services::chirps::prepare_body;

fn parse_chirp_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Chirp ID is not valid UUID".into()))
}

/// `POST /api/chirps`: post a chirp as the caller. Requires authentication.
pub async fn create_chirp_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<CreateChirpRequest>,
) -> AppResult<(StatusCode, Json<ChirpResponse>)> {
    let cleaned = prepare_body(&body.body)?;
    let chirp = state.store.create_chirp(user_id, &cleaned).await?;
    Ok((StatusCode::CREATED, Json(chirp.into())))
}

/// `GET /api/chirps`: list chirps, optionally by `author_id`, sorted by `sort`.
pub async fn list_chirps_handler(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> AppResult<Json<Vec<ChirpResponse>>> {
    let author = match query.author_id.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid UUID".into()))?,
        ),
        None => None,
    };
    let sort = SortOrder::from_query(query.sort.as_deref());
    let chirps = state.store.list_chirps(author, sort).await?;
    Ok(Json(chirps.into_iter().map(ChirpResponse::from).collect()))
}

/// `GET /api/chirps/{chirpID}`: fetch one chirp.
pub async fn get_chirp_handler(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> AppResult<Json<ChirpResponse>> {
    let chirp_id = parse_chirp_id(&chirp_id)?;
    let chirp = state
        .store
        .find_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".into()))?;
    Ok(Json(chirp.into()))
}

/// `DELETE /api/chirps/{chirpID}`: delete one of the caller's chirps.
///
/// Existence is checked before ownership: a missing chirp is 404, someone
/// else's chirp is 403.
pub async fn delete_chirp_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(chirp_id): Path<String>,
) -> AppResult<StatusCode> {
    let chirp_id = parse_chirp_id(&chirp_id)?;
    let chirp = state
        .store
        .find_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".into()))?;

    authorize_owner(user_id, chirp.user_id)
        .map_err(|_| AppError::Forbidden("You may not delete chirps that are not yours".into()))?;

    if !state.store.delete_chirp(chirp_id).await? {
        return Err(AppError::NotFound("Chirp not found".into()));
    }
    info!(%chirp_id, %user_id, "deleted chirp");
    Ok(StatusCode::NO_CONTENT)
}
