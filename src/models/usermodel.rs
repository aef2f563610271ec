use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub image: Option<String>,

    // Device push tokens, one per signed-in device
    #[serde(skip_serializing)]
    pub fcm_token: Vec<String>,
    pub device_type: String,
    pub language: String,

    pub referral_code: Option<String>,
    pub coin_earned: i32,
    pub call_balance: i32,
    pub alert_balance: i32,

    /// Zero until the user's first profile-completing action.
    #[serde(skip_serializing)]
    pub model_use_count: i32,

    pub is_blocked: bool,
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        !self.is_blocked && !self.is_deleted
    }
}
