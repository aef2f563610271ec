use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::Store,
    models::referralmodel::{CreditResult, ReferralOutcome, ReferralStats},
    service::error::ServiceError,
};

/// Trims and uppercases a claimed referral code. Blank or non-alphanumeric
/// input yields `None`.
pub fn normalize_referral_code(raw: &str) -> Option<String> {
    let code = raw.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(code.to_ascii_uppercase())
}

#[derive(Clone)]
pub struct ReferralService {
    db_client: Arc<dyn Store>,
}

impl ReferralService {
    pub fn new(db_client: Arc<dyn Store>) -> Self {
        Self { db_client }
    }

    /// Credits the owner of `referral_code` for bringing in `referred_user_id`.
    ///
    /// Unknown codes, self-referrals, a missing platform policy, a referrer
    /// at the cap and an already credited user all return a skipped outcome
    /// rather than an error. Only store failures surface.
    pub async fn try_credit_referral(
        &self,
        referred_user_id: Uuid,
        referral_code: &str,
    ) -> Result<ReferralOutcome, ServiceError> {
        let Some(code) = normalize_referral_code(referral_code) else {
            tracing::debug!("Ignoring malformed referral code from {}", referred_user_id);
            return Ok(ReferralOutcome::skipped());
        };

        let Some(referrer) = self.db_client.get_user_by_referral_code(&code).await? else {
            tracing::warn!("Referral code {} does not belong to any user", code);
            return Ok(ReferralOutcome::skipped());
        };

        if referrer.id == referred_user_id {
            tracing::warn!("User {} tried to refer themselves", referred_user_id);
            return Ok(ReferralOutcome::skipped());
        }

        let Some(policy) = self.db_client.get_platform_policy().await? else {
            tracing::warn!("Platform settings missing, referral for {} not credited", referred_user_id);
            return Ok(ReferralOutcome::skipped());
        };

        let result = self
            .db_client
            .credit_referral(
                referrer.id,
                referred_user_id,
                policy.reward_per_referral,
                policy.max_referral_allowed,
            )
            .await?;

        match result {
            CreditResult::Credited(record) => {
                tracing::info!(
                    "Referral credited: {} earned {} for referring {}",
                    record.referred_by,
                    record.reward_earned,
                    record.referred_to
                );
                Ok(ReferralOutcome::credited(record.reward_earned))
            }
            CreditResult::CapReached => {
                tracing::info!(
                    "Referrer {} reached the limit of {} referrals",
                    referrer.id,
                    policy.max_referral_allowed
                );
                Ok(ReferralOutcome::skipped())
            }
            CreditResult::AlreadyCredited => {
                tracing::debug!("User {} was already credited as a referral", referred_user_id);
                Ok(ReferralOutcome::skipped())
            }
        }
    }

    /// First profile completion gate. Only the call that consumes the zero
    /// first-use counter may credit a referral; referral failures never fail
    /// the profile update.
    pub async fn complete_profile(
        &self,
        user_id: Uuid,
        referral_code: Option<&str>,
    ) -> Result<ReferralOutcome, ServiceError> {
        let prior_uses = self
            .db_client
            .consume_first_use(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;

        if prior_uses != 0 {
            return Ok(ReferralOutcome::skipped());
        }

        let Some(code) = referral_code else {
            return Ok(ReferralOutcome::skipped());
        };

        match self.try_credit_referral(user_id, code).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!("Referral evaluation for {} failed: {}", user_id, e);
                Ok(ReferralOutcome::skipped())
            }
        }
    }

    pub async fn get_referral_stats(&self, user_id: Uuid) -> Result<ReferralStats, ServiceError> {
        Ok(self.db_client.get_referral_stats(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::usermodel::User,
        testing,
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        referrals: ReferralService,
        referrer: User,
    }

    async fn fixture(max: i32, reward: i32) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let referrer = testing::user("ABC123", &[]);
        store.insert_user(referrer.clone()).await;
        store.set_policy(Some(testing::policy(max, reward))).await;

        Fixture {
            referrals: ReferralService::new(store.clone()),
            store,
            referrer,
        }
    }

    async fn new_user(store: &MemoryStore, code: &str) -> User {
        let user = testing::user(code, &[]);
        store.insert_user(user.clone()).await;
        user
    }

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_referral_code("  abc123 "), Some("ABC123".to_string()));
        assert_eq!(normalize_referral_code("   "), None);
        assert_eq!(normalize_referral_code("ab-12"), None);
    }

    #[tokio::test]
    async fn credit_creates_record_and_increments_balance() {
        let f = fixture(50, 5).await;
        let referred = new_user(&f.store, "NEW001").await;

        let outcome = f.referrals.try_credit_referral(referred.id, " abc123").await.unwrap();
        assert_eq!(outcome, ReferralOutcome::credited(5));

        let records = f.store.referrals().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].referred_by, f.referrer.id);
        assert_eq!(records[0].referred_to, referred.id);
        assert_eq!(f.store.user(f.referrer.id).await.unwrap().coin_earned, 5);

        let stats = f.referrals.get_referral_stats(f.referrer.id).await.unwrap();
        assert_eq!(stats.total_referrals, 1);
        assert_eq!(stats.total_reward_earned, 5);
    }

    #[tokio::test]
    async fn concurrent_duplicate_credits_apply_once() {
        let f = fixture(50, 5).await;
        let referred = new_user(&f.store, "NEW002").await;

        let (first, second) = tokio::join!(
            f.referrals.try_credit_referral(referred.id, "ABC123"),
            f.referrals.try_credit_referral(referred.id, "ABC123"),
        );

        let applied = [first.unwrap(), second.unwrap()].iter().filter(|o| o.applied).count();
        assert_eq!(applied, 1);
        assert_eq!(f.store.referrals().await.len(), 1);
        assert_eq!(f.store.user(f.referrer.id).await.unwrap().coin_earned, 5);
    }

    #[tokio::test]
    async fn referrer_at_cap_gets_nothing_more() {
        let f = fixture(2, 5).await;
        for code in ["NEW003", "NEW004"] {
            let user = new_user(&f.store, code).await;
            assert!(f.referrals.try_credit_referral(user.id, "ABC123").await.unwrap().applied);
        }

        let late = new_user(&f.store, "NEW005").await;
        let outcome = f.referrals.try_credit_referral(late.id, "ABC123").await.unwrap();

        assert_eq!(outcome, ReferralOutcome::skipped());
        assert_eq!(f.store.referrals().await.len(), 2);
        assert_eq!(f.store.user(f.referrer.id).await.unwrap().coin_earned, 10);
    }

    #[tokio::test]
    async fn concurrent_credits_never_exceed_cap() {
        let f = fixture(1, 5).await;
        let one = new_user(&f.store, "NEW006").await;
        let two = new_user(&f.store, "NEW007").await;

        let (a, b) = tokio::join!(
            f.referrals.try_credit_referral(one.id, "ABC123"),
            f.referrals.try_credit_referral(two.id, "ABC123"),
        );

        assert_eq!(a.unwrap().applied as u8 + b.unwrap().applied as u8, 1);
        assert_eq!(f.store.referrals().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_code_is_a_silent_no_op() {
        let f = fixture(50, 5).await;
        let referred = new_user(&f.store, "NEW008").await;

        let outcome = f.referrals.try_credit_referral(referred.id, "NOPE99").await.unwrap();
        assert_eq!(outcome, ReferralOutcome::skipped());
        assert!(f.store.referrals().await.is_empty());
    }

    #[tokio::test]
    async fn missing_policy_grants_nothing() {
        let f = fixture(50, 5).await;
        f.store.set_policy(None).await;
        let referred = new_user(&f.store, "NEW009").await;

        let outcome = f.referrals.try_credit_referral(referred.id, "ABC123").await.unwrap();
        assert!(!outcome.applied);
        assert_eq!(f.store.user(f.referrer.id).await.unwrap().coin_earned, 0);
    }

    #[tokio::test]
    async fn self_referral_is_ignored() {
        let f = fixture(50, 5).await;
        let outcome = f.referrals.try_credit_referral(f.referrer.id, "abc123").await.unwrap();
        assert!(!outcome.applied);
        assert!(f.store.referrals().await.is_empty());
    }

    #[tokio::test]
    async fn only_the_first_profile_completion_credits() {
        let f = fixture(50, 5).await;
        let referred = new_user(&f.store, "NEW010").await;

        let first = f.referrals.complete_profile(referred.id, Some("abc123")).await.unwrap();
        let second = f.referrals.complete_profile(referred.id, Some("abc123")).await.unwrap();

        assert!(first.applied);
        assert!(!second.applied);
        assert_eq!(f.store.user(referred.id).await.unwrap().model_use_count, 2);
        assert_eq!(f.store.user(f.referrer.id).await.unwrap().coin_earned, 5);
    }

    #[tokio::test]
    async fn completing_an_unknown_profile_is_not_found() {
        let f = fixture(50, 5).await;
        let err = f.referrals.complete_profile(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
