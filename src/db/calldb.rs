use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::DBClient;
use crate::models::callmodel::{CallEvent, CallSession, CallStatus, NO_ANSWER_REASON};

const CALL_COLUMNS: &str = r#"
    id, call_id, caller_id, receiver_id, status,
    started_at, answered_at, ended_at,
    duration_in_seconds, failure_reason,
    created_at, updated_at
"#;

#[async_trait]
pub trait CallExt: Send + Sync {
    /// Inserts a fresh session. `None` if `call_id` is already taken.
    async fn create_call(
        &self,
        session: &CallSession,
    ) -> Result<Option<CallSession>, sqlx::Error>;

    async fn get_call(
        &self,
        call_id: &str,
    ) -> Result<Option<CallSession>, sqlx::Error>;

    /// Applies `event` only if the stored status still admits it.
    /// `None` when the session is missing or in the wrong state.
    async fn apply_call_event(
        &self,
        call_id: &str,
        event: CallEvent,
        at: DateTime<Utc>,
    ) -> Result<Option<CallSession>, sqlx::Error>;
}

fn status_list(statuses: &[CallStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s.to_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl CallExt for DBClient {
    async fn create_call(
        &self,
        session: &CallSession,
    ) -> Result<Option<CallSession>, sqlx::Error> {
        sqlx::query_as::<_, CallSession>(&format!(
            r#"
            INSERT INTO calls (id, call_id, caller_id, receiver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (call_id) DO NOTHING
            RETURNING {}
            "#,
            CALL_COLUMNS
        ))
        .bind(session.id)
        .bind(&session.call_id)
        .bind(session.caller_id)
        .bind(session.receiver_id)
        .bind(session.status)
        .bind(session.created_at)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_call(
        &self,
        call_id: &str,
    ) -> Result<Option<CallSession>, sqlx::Error> {
        sqlx::query_as::<_, CallSession>(&format!(
            "SELECT {} FROM calls WHERE call_id = $1",
            CALL_COLUMNS
        ))
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn apply_call_event(
        &self,
        call_id: &str,
        event: CallEvent,
        at: DateTime<Utc>,
    ) -> Result<Option<CallSession>, sqlx::Error> {
        let assignments = match event {
            CallEvent::Answered => "answered_at = $2, started_at = $2",
            CallEvent::Ended => {
                r#"ended_at = $2,
                   duration_in_seconds = CASE
                       WHEN started_at IS NULL THEN 0
                       ELSE GREATEST(0, FLOOR(EXTRACT(EPOCH FROM ($2 - started_at))))::BIGINT
                   END"#
            }
            CallEvent::Failed => "ended_at = $2, failure_reason = $4",
        };

        let query = format!(
            r#"
            UPDATE calls
            SET status = $3, {}, updated_at = $2
            WHERE call_id = $1 AND status IN ({})
            RETURNING {}
            "#,
            assignments,
            status_list(event.allowed_from()),
            CALL_COLUMNS
        );

        let mut update = sqlx::query_as::<_, CallSession>(&query)
            .bind(call_id)
            .bind(at)
            .bind(event.target());

        if event == CallEvent::Failed {
            update = update.bind(NO_ANSWER_REASON);
        }

        update.fetch_optional(&self.pool).await
    }
}
