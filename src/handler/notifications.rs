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
        notificationdtos::{InitiateAlertDto, MarkNotificationReadDto},
        parse_id, ApiResponse, RequestQueryDto,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::{
        activitymodel::{ActivityType, NewActivity},
        notificationmodel::NotificationKind,
    },
    service::{error::ServiceError, notification_service::PushNotice, translations},
    AppState,
};

pub fn notifications_handler() -> Router {
    Router::new()
        .route(
            "/notifications",
            get(get_notifications).post(mark_notification_read),
        )
        .route("/initiate-alert", post(initiate_alert))
}

pub async fn get_notifications(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query_params.bounds();
    let notifications = app_state
        .notifications
        .get_user_notifications(auth.user.id, limit, offset)
        .await?;

    Ok(Json(ApiResponse::success("Notifications fetched", notifications)))
}

pub async fn mark_notification_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<MarkNotificationReadDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let notification_id = parse_id(&body.notification_id, "notificationId")?;
    let notification = app_state
        .notifications
        .mark_notification_read(notification_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Notification marked as read", notification)))
}

pub async fn initiate_alert(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<InitiateAlertDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let kind = body
        .kind
        .parse::<NotificationKind>()
        .ok()
        .filter(NotificationKind::is_alert)
        .ok_or_else(|| HttpError::bad_request("Invalid alert type"))?;

    let receiver_id = parse_id(&body.receiver_id, "receiverId")?;
    if receiver_id == auth.user.id {
        return Err(HttpError::bad_request("You cannot alert yourself"));
    }

    let receiver = app_state
        .db_client
        .get_user(receiver_id)
        .await
        .map_err(ServiceError::from)?
        .filter(|u| u.is_active())
        .ok_or_else(|| HttpError::not_found("Receiver not found"))?;

    let registration_number = body.registration_number.trim().to_uppercase();
    let content = translations::resolve(&body.kind, &receiver.language, Some(registration_number.as_str()));

    let receipt = app_state
        .notifications
        .send(
            PushNotice::to_user(&receiver, kind)
                .from_sender(auth.user.id)
                .about(Some(registration_number.clone()))
                .with_content(content),
        )
        .await;

    app_state.activity.record(
        NewActivity::new(auth.user.id, ActivityType::Alert, format!("Sent {}", kind.to_str()))
            .with_registration(registration_number),
    );

    Ok(Json(ApiResponse::success("Alert sent", receipt.notification)))
}
