// service/call_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::Store,
    models::{
        activitymodel::{ActivityType, NewActivity},
        callmodel::{CallEvent, CallSession},
        notificationmodel::NotificationKind,
    },
    service::{
        activity_service::ActivityService,
        error::ServiceError,
        notification_service::{NotificationService, PushNotice},
    },
};

#[derive(Clone)]
pub struct CallService {
    db_client: Arc<dyn Store>,
    activity: ActivityService,
    notifications: Arc<NotificationService>,
}

impl CallService {
    pub fn new(
        db_client: Arc<dyn Store>,
        activity: ActivityService,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            activity,
            notifications,
        }
    }

    pub async fn initiate(&self, caller_id: Uuid, receiver_id: Uuid) -> Result<CallSession, ServiceError> {
        if caller_id == receiver_id {
            return Err(ServiceError::InvalidArgument("You cannot call yourself".to_string()));
        }

        match self.db_client.get_user(receiver_id).await? {
            Some(receiver) if receiver.is_active() => {}
            _ => return Err(ServiceError::NotFound("Receiver".to_string())),
        }

        let session = CallSession::new(Uuid::new_v4().to_string(), caller_id, receiver_id, Utc::now());
        let created = self
            .db_client
            .create_call(&session)
            .await?
            .ok_or_else(|| ServiceError::Conflict(format!("Call {} already exists", session.call_id)))?;

        tracing::info!("Call {} initiated by {} to {}", created.call_id, caller_id, receiver_id);
        Ok(created)
    }

    /// Session view for one of its participants. Anyone else gets `NotFound`.
    pub async fn get_session(&self, user_id: Uuid, call_id: &str) -> Result<CallSession, ServiceError> {
        self.db_client
            .get_call(call_id)
            .await?
            .filter(|session| session.is_participant(user_id))
            .ok_or_else(|| ServiceError::NotFound(format!("Call {}", call_id)))
    }

    /// Transition driven by a participant, with the event given as text.
    pub async fn transition_by(
        &self,
        user_id: Uuid,
        call_id: &str,
        status: &str,
    ) -> Result<CallSession, ServiceError> {
        let event = status
            .parse::<CallEvent>()
            .map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;

        self.get_session(user_id, call_id).await?;
        self.transition(call_id, event).await
    }

    pub async fn transition(&self, call_id: &str, event: CallEvent) -> Result<CallSession, ServiceError> {
        self.transition_at(call_id, event, Utc::now()).await
    }

    /// Applies `event` against the stored status. The update only lands if the
    /// status still admits it, so concurrent terminal events resolve to one
    /// winner and the loser sees `InvalidCallState`.
    pub async fn transition_at(
        &self,
        call_id: &str,
        event: CallEvent,
        at: DateTime<Utc>,
    ) -> Result<CallSession, ServiceError> {
        let Some(session) = self.db_client.apply_call_event(call_id, event, at).await? else {
            return Err(match self.db_client.get_call(call_id).await? {
                Some(current) => ServiceError::InvalidCallState {
                    call_id: call_id.to_string(),
                    current: current.status,
                    requested: event.target(),
                },
                None => ServiceError::NotFound(format!("Call {}", call_id)),
            });
        };

        tracing::info!("Call {} moved to {}", session.call_id, session.status);

        match event {
            CallEvent::Answered => {
                self.activity.record_many(vec![
                    NewActivity::new(session.caller_id, ActivityType::Call, "Outgoing call"),
                    NewActivity::new(session.receiver_id, ActivityType::ReceivedCall, "Incoming call"),
                ]);
            }
            CallEvent::Ended => {}
            CallEvent::Failed => self.on_failed(&session).await,
        }

        Ok(session)
    }

    async fn on_failed(&self, session: &CallSession) {
        self.activity.record(NewActivity::new(
            session.caller_id,
            ActivityType::FailedCall,
            "Call not answered",
        ));

        // Caller identity stays out of the missed-call notification
        match self.db_client.get_user(session.receiver_id).await {
            Ok(Some(receiver)) => {
                self.notifications
                    .send(PushNotice::to_user(&receiver, NotificationKind::Call))
                    .await;
            }
            Ok(None) => tracing::warn!(
                "Receiver {} of call {} not found, missed-call notification skipped",
                session.receiver_id,
                session.call_id
            ),
            Err(e) => tracing::error!(
                "Failed to load receiver {} of call {}: {}",
                session.receiver_id,
                session.call_id,
                e
            ),
        }
    }
}
