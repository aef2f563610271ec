use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::usermodel::User;

pub(crate) const USER_COLUMNS: &str = r#"
    id, full_name, email, image,
    fcm_token, device_type, language,
    referral_code, coin_earned, call_balance, alert_balance,
    model_use_count, is_blocked, is_deleted,
    created_at, updated_at
"#;

#[async_trait]
pub trait UserExt: Send + Sync {
    async fn get_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error>;

    /// `referral_code` must already be trimmed and uppercased.
    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn remove_fcm_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), sqlx::Error>;

    /// Increments the first-use counter and returns the value it held before,
    /// in one statement. `None` when the user does not exist.
    async fn consume_first_use(
        &self,
        user_id: Uuid,
    ) -> Result<Option<i32>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE UPPER(referral_code) = $1 AND is_deleted = false
            "#,
            USER_COLUMNS
        ))
        .bind(referral_code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn remove_fcm_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET fcm_token = array_remove(fcm_token, $2), updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_first_use(
        &self,
        user_id: Uuid,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET model_use_count = model_use_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING model_use_count - 1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    use crate::testing;

    #[sqlx::test(migrations = "./migrations")]
    async fn first_use_is_consumed_exactly_once(pool: PgPool) {
        let db = DBClient::new(pool.clone());
        let user_id = testing::insert_user_row(&pool, "USE001").await;

        assert_eq!(db.consume_first_use(user_id).await.unwrap(), Some(0));
        assert_eq!(db.consume_first_use(user_id).await.unwrap(), Some(1));
        assert_eq!(db.consume_first_use(Uuid::new_v4()).await.unwrap(), None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn referral_codes_match_case_insensitively(pool: PgPool) {
        let db = DBClient::new(pool.clone());
        let user_id = testing::insert_user_row(&pool, "abc123").await;

        let found = db.get_user_by_referral_code("ABC123").await.unwrap().unwrap();
        assert_eq!(found.id, user_id);

        sqlx::query("UPDATE users SET is_deleted = true WHERE id = $1")
            .bind(user_id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(db.get_user_by_referral_code("ABC123").await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn dead_push_token_is_removed(pool: PgPool) {
        let db = DBClient::new(pool.clone());
        let user_id = testing::insert_user_row(&pool, "TOK001").await;

        db.remove_fcm_token(user_id, "device-a").await.unwrap();

        let user = db.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.fcm_token, vec!["device-b".to_string()]);
    }
}
