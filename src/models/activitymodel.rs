use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "activity_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Login,
    Logout,
    VehicleSearched,
    Alert,
    Call,
    ReceivedCall,
    FailedCall,
    VehicleAdded,
    VehicleRemoved,
    DeleteAccount,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: ActivityType,
    pub title: Option<String>,
    pub registration_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An activity entry waiting to be appended to the log.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub kind: ActivityType,
    pub title: String,
    pub registration_number: Option<String>,
}

impl NewActivity {
    pub fn new(user_id: Uuid, kind: ActivityType, title: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            registration_number: None,
        }
    }

    pub fn with_registration(mut self, registration_number: impl Into<String>) -> Self {
        self.registration_number = Some(registration_number.into());
        self
    }
}
