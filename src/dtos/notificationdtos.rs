use serde::Deserialize;
use validator::Validate;

#[derive(Validate, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateAlertDto {
    #[validate(length(min = 1, message = "receiverId is required"))]
    pub receiver_id: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Alert type is required"))]
    pub kind: String,

    #[validate(length(min = 1, max = 20, message = "Registration number is required"))]
    pub registration_number: String,
}

#[derive(Validate, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkNotificationReadDto {
    #[validate(length(min = 1, message = "notificationId is required"))]
    pub notification_id: String,
}
