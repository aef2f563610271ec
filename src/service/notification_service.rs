// service/notification_service.rs
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use uuid::Uuid;

use crate::{
    db::Store,
    models::{
        notificationmodel::{FollowUp, Language, NewNotification, Notification, NotificationKind, ReadOutcome},
        usermodel::User,
    },
    service::{
        background::BackgroundTasks,
        error::ServiceError,
        fcm::{PushBatch, PushProvider, PUSH_BATCH_SIZE},
        translations::{self, Translation},
    },
};

/// A notification addressed to one user's devices.
#[derive(Debug, Clone)]
pub struct PushNotice {
    pub recipient_id: Uuid,
    pub tokens: Vec<String>,
    pub sender_id: Option<Uuid>,
    pub kind: NotificationKind,
    /// Registration number the notification is about, if any. Also the
    /// parameter for templated bodies.
    pub reference_id: Option<String>,
    pub language: Language,
    /// Explicit content; resolved from the translation catalog when absent.
    pub content: Option<Translation>,
}

impl PushNotice {
    pub fn to_user(recipient: &User, kind: NotificationKind) -> Self {
        Self {
            recipient_id: recipient.id,
            tokens: recipient.fcm_token.clone(),
            sender_id: None,
            kind,
            reference_id: None,
            language: Language::from_code_or_default(&recipient.language),
            content: None,
        }
    }

    pub fn from_sender(mut self, sender_id: Uuid) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    pub fn about(mut self, registration_number: Option<String>) -> Self {
        self.reference_id = registration_number;
        self
    }

    pub fn with_content(mut self, content: Translation) -> Self {
        self.content = Some(content);
        self
    }
}

#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    /// Audit record, `None` if it could not be written.
    pub notification: Option<Notification>,
    pub batches: usize,
}

#[derive(Clone)]
pub struct NotificationService {
    db_client: Arc<dyn Store>,
    push: Arc<dyn PushProvider>,
    tasks: BackgroundTasks,
}

impl NotificationService {
    pub fn new(db_client: Arc<dyn Store>, push: Arc<dyn PushProvider>, tasks: BackgroundTasks) -> Self {
        Self { db_client, push, tasks }
    }

    /// Writes one audit record and fans the push out in batches. Delivery runs
    /// detached; neither audit nor delivery failures reach the caller.
    pub async fn send(&self, notice: PushNotice) -> DispatchReceipt {
        let content = notice.content.clone().unwrap_or_else(|| {
            translations::resolve_kind(notice.kind, notice.language, notice.reference_id.as_deref())
        });

        let notification = match self
            .db_client
            .create_notification(NewNotification {
                user_id: notice.recipient_id,
                sender_id: notice.sender_id,
                kind: notice.kind,
                title: content.title.clone(),
                body: content.body.clone(),
                registration_number: notice.reference_id.clone(),
            })
            .await
        {
            Ok(notification) => Some(notification),
            Err(e) => {
                tracing::error!(
                    "Failed to store {} notification for user {}: {}",
                    notice.kind.to_str(),
                    notice.recipient_id,
                    e
                );
                None
            }
        };

        let batches = self.dispatch(
            Some(notice.recipient_id),
            &notice.tokens,
            notice.kind,
            notice.reference_id.as_deref(),
            &content,
            notice.language,
        );

        DispatchReceipt { notification, batches }
    }

    /// Pushes `content` to `tokens` in batches of `PUSH_BATCH_SIZE`, each on its
    /// own detached task. Returns the number of batches started.
    pub fn dispatch(
        &self,
        owner: Option<Uuid>,
        tokens: &[String],
        kind: NotificationKind,
        reference_id: Option<&str>,
        content: &Translation,
        language: Language,
    ) -> usize {
        let mut seen = HashSet::new();
        let tokens: Vec<String> = tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty() && seen.insert(*t))
            .map(str::to_string)
            .collect();

        if tokens.is_empty() {
            tracing::debug!("No push tokens for {} notification, skipping push", kind.to_str());
            return 0;
        }

        let mut data = HashMap::new();
        data.insert("type".to_string(), kind.to_str().to_string());
        data.insert("referenceId".to_string(), reference_id.unwrap_or_default().to_string());
        data.insert("language".to_string(), language.to_str().to_string());

        let batches: Vec<PushBatch> = tokens
            .chunks(PUSH_BATCH_SIZE)
            .map(|chunk| PushBatch {
                tokens: chunk.to_vec(),
                title: content.title.clone(),
                body: content.body.clone(),
                data: data.clone(),
            })
            .collect();

        let count = batches.len();
        tracing::info!(
            "Sending push notifications in {} batch(es) [Language: {}]",
            count,
            language.to_str()
        );

        for batch in batches {
            let push = self.push.clone();
            let db_client = self.db_client.clone();

            self.tasks.spawn(async move {
                match push.send_batch(&batch).await {
                    Ok(report) => {
                        tracing::debug!("Push batch delivered to {} device(s)", report.delivered);

                        let Some(owner) = owner else { return };
                        for token in report.invalid_tokens {
                            if let Err(e) = db_client.remove_fcm_token(owner, &token).await {
                                tracing::warn!("Failed to drop dead push token for {}: {}", owner, e);
                            }
                        }
                    }
                    Err(e) => tracing::error!("Push notification batch failed: {}", e),
                }
            });
        }

        count
    }

    pub async fn get_user_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.db_client.get_user_notifications(user_id, limit, offset).await?)
    }

    /// Marks a notification read. The first read of an alert notifies the
    /// alert's sender; repeated reads change nothing.
    pub async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, ServiceError> {
        let outcome = self
            .db_client
            .mark_notification_read(notification_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Notification {}", notification_id)))?;

        match outcome {
            ReadOutcome::AlreadyRead(notification) => Ok(notification),
            ReadOutcome::MarkedRead(notification) => {
                match notification.kind.follow_up() {
                    Some(FollowUp::AcknowledgeSender) => self.acknowledge_sender(&notification).await,
                    None => {}
                }
                Ok(notification)
            }
        }
    }

    async fn acknowledge_sender(&self, alert: &Notification) {
        let Some(sender_id) = alert.sender_id else {
            tracing::debug!("Alert {} has no sender, nothing to acknowledge", alert.id);
            return;
        };

        let sender = match self.db_client.get_user(sender_id).await {
            Ok(Some(sender)) if sender.is_active() => sender,
            Ok(_) => {
                tracing::warn!("Sender {} of alert {} no longer exists", sender_id, alert.id);
                return;
            }
            Err(e) => {
                tracing::error!("Failed to load sender {} of alert {}: {}", sender_id, alert.id, e);
                return;
            }
        };

        let notice = PushNotice::to_user(&sender, NotificationKind::AlertAcknowledged)
            .from_sender(alert.user_id)
            .about(alert.registration_number.clone());

        self.send(notice).await;
    }
}
