//! In-process store with the same conditional semantics as the Postgres
//! implementations. Test-only.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    activitydb::ActivityExt, calldb::CallExt, notificationdb::NotificationExt,
    referraldb::ReferralExt, userdb::UserExt,
};
use crate::models::{
    activitymodel::{NewActivity, UserActivity},
    callmodel::{CallEvent, CallSession},
    notificationmodel::{NewNotification, Notification, ReadOutcome},
    referralmodel::{CreditResult, PlatformPolicy, ReferralRecord, ReferralStats},
    usermodel::User,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    calls: HashMap<String, CallSession>,
    referrals: Vec<ReferralRecord>,
    policy: Option<PlatformPolicy>,
    notifications: Vec<Notification>,
    activities: Vec<UserActivity>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    pub async fn set_policy(&self, policy: Option<PlatformPolicy>) {
        self.state.lock().await.policy = policy;
    }

    pub async fn user(&self, user_id: Uuid) -> Option<User> {
        self.state.lock().await.users.get(&user_id).cloned()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.clone()
    }

    pub async fn activities(&self) -> Vec<UserActivity> {
        self.state.lock().await.activities.clone()
    }

    pub async fn referrals(&self) -> Vec<ReferralRecord> {
        self.state.lock().await.referrals.clone()
    }
}

fn page<T>(items: impl DoubleEndedIterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .rev()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user(user_id).await)
    }

    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| {
                !u.is_deleted
                    && u.referral_code.as_deref().map(str::to_uppercase).as_deref() == Some(referral_code)
            })
            .cloned())
    }

    async fn remove_fcm_token(&self, user_id: Uuid, token: &str) -> Result<(), sqlx::Error> {
        if let Some(user) = self.state.lock().await.users.get_mut(&user_id) {
            user.fcm_token.retain(|t| t != token);
        }
        Ok(())
    }

    async fn consume_first_use(&self, user_id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(&user_id).map(|user| {
            let prior = user.model_use_count;
            user.model_use_count += 1;
            prior
        }))
    }
}

#[async_trait]
impl CallExt for MemoryStore {
    async fn create_call(&self, session: &CallSession) -> Result<Option<CallSession>, sqlx::Error> {
        let mut state = self.state.lock().await;
        if state.calls.contains_key(&session.call_id) {
            return Ok(None);
        }
        state.calls.insert(session.call_id.clone(), session.clone());
        Ok(Some(session.clone()))
    }

    async fn get_call(&self, call_id: &str) -> Result<Option<CallSession>, sqlx::Error> {
        Ok(self.state.lock().await.calls.get(call_id).cloned())
    }

    async fn apply_call_event(
        &self,
        call_id: &str,
        event: CallEvent,
        at: DateTime<Utc>,
    ) -> Result<Option<CallSession>, sqlx::Error> {
        let mut state = self.state.lock().await;
        let Some(session) = state.calls.get_mut(call_id) else {
            return Ok(None);
        };
        if !session.apply(event, at) {
            return Ok(None);
        }
        Ok(Some(session.clone()))
    }
}

#[async_trait]
impl ReferralExt for MemoryStore {
    async fn get_platform_policy(&self) -> Result<Option<PlatformPolicy>, sqlx::Error> {
        Ok(self.state.lock().await.policy.clone())
    }

    async fn credit_referral(
        &self,
        referred_by: Uuid,
        referred_to: Uuid,
        reward: i32,
        cap: i32,
    ) -> Result<CreditResult, sqlx::Error> {
        let mut state = self.state.lock().await;

        if state.referrals.iter().any(|r| r.referred_to == referred_to) {
            return Ok(CreditResult::AlreadyCredited);
        }

        let existing = state.referrals.iter().filter(|r| r.referred_by == referred_by).count();
        if existing as i64 >= i64::from(cap) {
            return Ok(CreditResult::CapReached);
        }

        let record = ReferralRecord {
            id: Uuid::new_v4(),
            referred_by,
            referred_to,
            reward_earned: reward,
            created_at: Utc::now(),
        };
        state.referrals.push(record.clone());
        if let Some(referrer) = state.users.get_mut(&referred_by) {
            referrer.coin_earned += reward;
        }

        Ok(CreditResult::Credited(record))
    }

    async fn get_referral_stats(&self, referred_by: Uuid) -> Result<ReferralStats, sqlx::Error> {
        let state = self.state.lock().await;
        let mine = state.referrals.iter().filter(|r| r.referred_by == referred_by);
        Ok(ReferralStats {
            total_referrals: mine.clone().count() as i64,
            total_reward_earned: mine.map(|r| i64::from(r.reward_earned)).sum(),
        })
    }
}

#[async_trait]
impl NotificationExt for MemoryStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        let now = Utc::now();
        let stored = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            sender_id: notification.sender_id,
            kind: notification.kind,
            title: Some(notification.title),
            body: Some(notification.body),
            is_read: false,
            registration_number: notification.registration_number,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.notifications.push(stored.clone());
        Ok(stored)
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReadOutcome>, sqlx::Error> {
        let mut state = self.state.lock().await;
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        else {
            return Ok(None);
        };

        if notification.is_read {
            return Ok(Some(ReadOutcome::AlreadyRead(notification.clone())));
        }
        notification.is_read = true;
        notification.updated_at = Utc::now();
        Ok(Some(ReadOutcome::MarkedRead(notification.clone())))
    }

    async fn get_user_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let state = self.state.lock().await;
        let mine: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(page(mine.into_iter(), limit, offset))
    }
}

#[async_trait]
impl ActivityExt for MemoryStore {
    async fn record_activity(&self, activity: NewActivity) -> Result<UserActivity, sqlx::Error> {
        let stored = UserActivity {
            id: Uuid::new_v4(),
            user_id: activity.user_id,
            kind: activity.kind,
            title: Some(activity.title),
            registration_number: activity.registration_number,
            created_at: Utc::now(),
        };
        self.state.lock().await.activities.push(stored.clone());
        Ok(stored)
    }

    async fn get_user_activity(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserActivity>, sqlx::Error> {
        let state = self.state.lock().await;
        let mine: Vec<UserActivity> = state
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(page(mine.into_iter(), limit, offset))
    }
}
