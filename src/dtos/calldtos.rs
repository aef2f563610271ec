use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateCallQueryDto {
    #[validate(length(min = 1, message = "receiverId is required"))]
    pub receiver_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateCallResponseDto {
    pub call_id: String,
    pub token: String,
    pub effective_time_in_seconds: i64,
}

#[derive(Validate, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCallStatusDto {
    #[validate(length(min = 1, message = "callId is required"))]
    pub call_id: String,

    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}
