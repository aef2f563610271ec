use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{
        calldtos::{InitiateCallQueryDto, InitiateCallResponseDto, UpdateCallStatusDto},
        parse_id, ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn calls_handler() -> Router {
    Router::new()
        .route("/initiate-call", get(initiate_call).patch(update_call_status))
        .route("/calls/:call_id", get(get_call))
        .route("/call-token", get(get_call_token))
}

pub async fn initiate_call(
    Query(query): Query<InitiateCallQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let receiver_id = parse_id(&query.receiver_id, "receiverId")?;

    // No session is created when the provider token cannot be issued
    let token = app_state.signaling.issue(&auth.user.id.to_string())?;
    let session = app_state.calls.initiate(auth.user.id, receiver_id).await?;

    Ok(Json(ApiResponse::success(
        "Call initiated",
        InitiateCallResponseDto {
            call_id: session.call_id,
            token: token.token,
            effective_time_in_seconds: token.effective_time_in_seconds,
        },
    )))
}

pub async fn update_call_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateCallStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let session = app_state
        .calls
        .transition_by(auth.user.id, body.call_id.trim(), &body.status)
        .await?;

    Ok(Json(ApiResponse::success("Call status updated", session)))
}

pub async fn get_call(
    Path(call_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let session = app_state.calls.get_session(auth.user.id, &call_id).await?;

    Ok(Json(ApiResponse::success("Call fetched", session)))
}

pub async fn get_call_token(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let token = app_state.signaling.issue(&auth.user.id.to_string())?;

    Ok(Json(ApiResponse::success("Token generated", token)))
}
