//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{memory::MemoryStore, Store},
    models::{referralmodel::PlatformPolicy, usermodel::User},
    service::{
        background::BackgroundTasks,
        fcm::{BatchReport, PushBatch, PushError, PushProvider},
        notification_service::NotificationService,
    },
};

pub fn user(referral_code: &str, tokens: &[&str]) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        full_name: format!("User {}", referral_code),
        email: format!("{}@example.com", referral_code.to_lowercase()),
        image: None,
        fcm_token: tokens.iter().map(|t| t.to_string()).collect(),
        device_type: "ANDROID".to_string(),
        language: "en".to_string(),
        referral_code: Some(referral_code.to_string()),
        coin_earned: 0,
        call_balance: 5,
        alert_balance: 10,
        model_use_count: 0,
        is_blocked: false,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

/// Inserts a bare user row for tests that run against Postgres.
pub async fn insert_user_row(pool: &PgPool, referral_code: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (email, referral_code, fcm_token)
        VALUES ($1, $2, ARRAY['device-a', 'device-b'])
        RETURNING id
        "#,
    )
    .bind(format!("{}@example.com", referral_code.to_lowercase()))
    .bind(referral_code)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn policy(max_referral_allowed: i32, reward_per_referral: i32) -> PlatformPolicy {
    PlatformPolicy {
        max_referral_allowed,
        reward_per_referral,
    }
}

/// Push provider that records every batch it is handed.
#[derive(Default)]
pub struct RecordingPush {
    batches: Mutex<Vec<PushBatch>>,
    fail: bool,
    dead_tokens: Vec<String>,
}

impl RecordingPush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_dead_tokens(tokens: &[&str]) -> Self {
        Self {
            dead_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<PushBatch> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushProvider for RecordingPush {
    async fn send_batch(&self, batch: &PushBatch) -> Result<BatchReport, PushError> {
        self.batches.lock().unwrap().push(batch.clone());
        if self.fail {
            return Err(PushError::NotConfigured);
        }
        Ok(BatchReport {
            delivered: batch.tokens.len(),
            invalid_tokens: batch
                .tokens
                .iter()
                .filter(|t| self.dead_tokens.contains(t))
                .cloned()
                .collect(),
        })
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub push: Arc<RecordingPush>,
    pub tasks: BackgroundTasks,
    pub notifications: Arc<NotificationService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_push(RecordingPush::new())
    }

    pub fn with_push(push: RecordingPush) -> Self {
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(push);
        let tasks = BackgroundTasks::new();
        let notifications = Arc::new(NotificationService::new(
            store.clone() as Arc<dyn Store>,
            push.clone() as Arc<dyn PushProvider>,
            tasks.clone(),
        ));
        Self {
            store,
            push,
            tasks,
            notifications,
        }
    }

    pub fn db(&self) -> Arc<dyn Store> {
        self.store.clone()
    }
}
