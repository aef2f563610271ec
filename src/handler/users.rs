use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{
        userdtos::{CompleteProfileDto, ProfileCompletedDto, ReferralSummaryDto},
        ApiResponse, RequestQueryDto,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/profile/complete", post(complete_profile))
        .route("/referrals", get(get_referral_stats))
        .route("/activity", get(get_activity))
}

pub async fn complete_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CompleteProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let referral = app_state
        .referrals
        .complete_profile(auth.user.id, body.referral_code.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        "Profile updated",
        ProfileCompletedDto { referral },
    )))
}

pub async fn get_referral_stats(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state.referrals.get_referral_stats(auth.user.id).await?;

    Ok(Json(ApiResponse::success(
        "Referral stats fetched",
        ReferralSummaryDto {
            referral_code: auth.user.referral_code.clone(),
            coin_earned: auth.user.coin_earned,
            stats,
        },
    )))
}

pub async fn get_activity(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query_params.bounds();
    let activity = app_state
        .activity
        .get_user_activity(auth.user.id, limit, offset)
        .await?;

    Ok(Json(ApiResponse::success("Activity fetched", activity)))
}
