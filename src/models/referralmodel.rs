use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub id: Uuid,
    pub referred_by: Uuid,
    pub referred_to: Uuid,
    pub reward_earned: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPolicy {
    pub max_referral_allowed: i32,
    pub reward_per_referral: i32,
}

/// What the store did with a credit request.
#[derive(Debug, Clone)]
pub enum CreditResult {
    Credited(ReferralRecord),
    /// The referrer already holds `max_referral_allowed` records.
    CapReached,
    /// The referred user was credited before, by any referrer.
    AlreadyCredited,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralOutcome {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<i32>,
}

impl ReferralOutcome {
    pub fn skipped() -> Self {
        Self { applied: false, reward: None }
    }

    pub fn credited(reward: i32) -> Self {
        Self { applied: true, reward: Some(reward) }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStats {
    pub total_referrals: i64,
    pub total_reward_earned: i64,
}
