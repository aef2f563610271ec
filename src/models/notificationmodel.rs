use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "notification_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    VehicleSearched,
    AlertHigh,
    AlertLow,
    Call,
    AlertAcknowledged,
}

/// Action taken once a recipient reads a notification of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Tell the original sender their alert was seen.
    AcknowledgeSender,
}

impl NotificationKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            NotificationKind::VehicleSearched => "VEHICLE_SEARCHED",
            NotificationKind::AlertHigh => "ALERT_HIGH",
            NotificationKind::AlertLow => "ALERT_LOW",
            NotificationKind::Call => "CALL",
            NotificationKind::AlertAcknowledged => "ALERT_ACKNOWLEDGED",
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, NotificationKind::AlertHigh | NotificationKind::AlertLow)
    }

    pub fn follow_up(&self) -> Option<FollowUp> {
        match self {
            NotificationKind::AlertHigh | NotificationKind::AlertLow => Some(FollowUp::AcknowledgeSender),
            NotificationKind::VehicleSearched
            | NotificationKind::Call
            | NotificationKind::AlertAcknowledged => None,
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "VEHICLE_SEARCHED" => Ok(NotificationKind::VehicleSearched),
            "ALERT_HIGH" => Ok(NotificationKind::AlertHigh),
            "ALERT_LOW" => Ok(NotificationKind::AlertLow),
            "CALL" => Ok(NotificationKind::Call),
            "ALERT_ACKNOWLEDGED" => Ok(NotificationKind::AlertAcknowledged),
            other => Err(format!("Unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
}

impl Language {
    pub fn to_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
        }
    }

    /// Parses a language code, `None` for anything unsupported.
    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            "mr" => Some(Language::Mr),
            _ => None,
        }
    }

    pub fn from_code_or_default(code: &str) -> Language {
        Language::from_code(code).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sender_id: Option<Uuid>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub body: Option<String>,
    pub is_read: bool,
    pub registration_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub registration_number: Option<String>,
}

/// Result of marking a notification read.
#[derive(Debug, Clone)]
pub enum ReadOutcome {
    /// Flipped from unread to read by this call.
    MarkedRead(Notification),
    AlreadyRead(Notification),
}
