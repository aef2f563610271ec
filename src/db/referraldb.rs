use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::referralmodel::{CreditResult, PlatformPolicy, ReferralRecord, ReferralStats};

#[async_trait]
pub trait ReferralExt: Send + Sync {
    async fn get_platform_policy(&self) -> Result<Option<PlatformPolicy>, sqlx::Error>;

    /// Records `referred_to` as referred by `referred_by` and adds `reward` to the
    /// referrer's coin balance, as one unit. Runs serialized per referrer so the
    /// cap holds at commit time.
    async fn credit_referral(
        &self,
        referred_by: Uuid,
        referred_to: Uuid,
        reward: i32,
        cap: i32,
    ) -> Result<CreditResult, sqlx::Error>;

    async fn get_referral_stats(
        &self,
        referred_by: Uuid,
    ) -> Result<ReferralStats, sqlx::Error>;
}

#[async_trait]
impl ReferralExt for DBClient {
    async fn get_platform_policy(&self) -> Result<Option<PlatformPolicy>, sqlx::Error> {
        sqlx::query_as::<_, PlatformPolicy>(
            r#"
            SELECT max_referral_allowed, reward_per_referral
            FROM platform_settings
            ORDER BY created_at ASC
            LIMIT 1
            "#
        )
        .fetch_optional(&self.pool)
        .await
    }

    async fn credit_referral(
        &self,
        referred_by: Uuid,
        referred_to: Uuid,
        reward: i32,
        cap: i32,
    ) -> Result<CreditResult, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Held until commit/rollback; concurrent credits for the same referrer queue here
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(referred_by)
            .execute(&mut *tx)
            .await?;

        let already_credited: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM successful_referrals WHERE referred_to = $1)"
        )
        .bind(referred_to)
        .fetch_one(&mut *tx)
        .await?;

        if already_credited {
            tx.rollback().await?;
            return Ok(CreditResult::AlreadyCredited);
        }

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM successful_referrals WHERE referred_by = $1"
        )
        .bind(referred_by)
        .fetch_one(&mut *tx)
        .await?;

        if existing >= i64::from(cap) {
            tx.rollback().await?;
            return Ok(CreditResult::CapReached);
        }

        // The unique index on referred_to still guards against a different referrer racing us
        let record = sqlx::query_as::<_, ReferralRecord>(
            r#"
            INSERT INTO successful_referrals (id, referred_by, referred_to, reward_earned)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (referred_to) DO NOTHING
            RETURNING id, referred_by, referred_to, reward_earned, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(referred_by)
        .bind(referred_to)
        .bind(reward)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            tx.rollback().await?;
            return Ok(CreditResult::AlreadyCredited);
        };

        sqlx::query(
            "UPDATE users SET coin_earned = coin_earned + $1, updated_at = NOW() WHERE id = $2"
        )
        .bind(reward)
        .bind(referred_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CreditResult::Credited(record))
    }

    async fn get_referral_stats(
        &self,
        referred_by: Uuid,
    ) -> Result<ReferralStats, sqlx::Error> {
        let (total_referrals, total_reward_earned): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_referrals,
                COALESCE(SUM(reward_earned), 0)::BIGINT AS total_reward_earned
            FROM successful_referrals
            WHERE referred_by = $1
            "#
        )
        .bind(referred_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(ReferralStats {
            total_referrals,
            total_reward_earned,
        })
    }
}
