use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failure reason stored when the receiver never picks up.
pub const NO_ANSWER_REASON: &str = "User did not answer";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "call_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Initiated,
    Ringing,
    Answered,
    Ended,
    Failed,
    Missed,
}

impl CallStatus {
    pub fn to_str(&self) -> &'static str {
        match self {
            CallStatus::Initiated => "INITIATED",
            CallStatus::Ringing => "RINGING",
            CallStatus::Answered => "ANSWERED",
            CallStatus::Ended => "ENDED",
            CallStatus::Failed => "FAILED",
            CallStatus::Missed => "MISSED",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Status change requested by one of the call's participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    Answered,
    Ended,
    Failed,
}

impl CallEvent {
    /// Stored statuses from which this event may be applied.
    pub fn allowed_from(&self) -> &'static [CallStatus] {
        match self {
            CallEvent::Answered => &[CallStatus::Initiated, CallStatus::Ringing],
            CallEvent::Ended => &[
                CallStatus::Initiated,
                CallStatus::Ringing,
                CallStatus::Answered,
            ],
            CallEvent::Failed => &[CallStatus::Initiated, CallStatus::Ringing],
        }
    }

    pub fn target(&self) -> CallStatus {
        match self {
            CallEvent::Answered => CallStatus::Answered,
            CallEvent::Ended => CallStatus::Ended,
            CallEvent::Failed => CallStatus::Failed,
        }
    }

    pub fn applies_to(&self, status: CallStatus) -> bool {
        self.allowed_from().contains(&status)
    }
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target().to_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCallEvent;

impl fmt::Display for InvalidCallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invalid call status")
    }
}

impl FromStr for CallEvent {
    type Err = InvalidCallEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ANSWERED" => Ok(CallEvent::Answered),
            "ENDED" => Ok(CallEvent::Ended),
            "FAILED" => Ok(CallEvent::Failed),
            _ => Err(InvalidCallEvent),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CallSession {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub call_id: String,
    pub caller_id: Uuid,
    pub receiver_id: Uuid,
    pub status: CallStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub answered_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_in_seconds: i64,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallSession {
    pub fn new(call_id: String, caller_id: Uuid, receiver_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_id,
            caller_id,
            receiver_id,
            status: CallStatus::Initiated,
            started_at: None,
            answered_at: None,
            ended_at: None,
            duration_in_seconds: 0,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.caller_id == user_id || self.receiver_id == user_id
    }

    /// Whole seconds between the call being picked up and `ended_at`,
    /// clamped at zero. A call that was never answered lasted zero seconds.
    pub fn duration_until(&self, ended_at: DateTime<Utc>) -> i64 {
        match self.started_at {
            Some(started_at) => (ended_at - started_at).num_seconds().max(0),
            None => 0,
        }
    }

    /// Applies `event` at `at`, mirroring the conditional update the store
    /// performs. Returns false and leaves the session untouched when the
    /// current status does not admit the event.
    pub fn apply(&mut self, event: CallEvent, at: DateTime<Utc>) -> bool {
        if !event.applies_to(self.status) {
            return false;
        }

        match event {
            CallEvent::Answered => {
                self.answered_at = Some(at);
                self.started_at = Some(at);
            }
            CallEvent::Ended => {
                self.duration_in_seconds = self.duration_until(at);
                self.ended_at = Some(at);
            }
            CallEvent::Failed => {
                self.failure_reason = Some(NO_ANSWER_REASON.to_string());
                self.ended_at = Some(at);
            }
        }

        self.status = event.target();
        self.updated_at = at;
        true
    }
}
