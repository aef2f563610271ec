use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::activitymodel::{NewActivity, UserActivity};

#[async_trait]
pub trait ActivityExt: Send + Sync {
    async fn record_activity(
        &self,
        activity: NewActivity,
    ) -> Result<UserActivity, sqlx::Error>;

    async fn get_user_activity(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserActivity>, sqlx::Error>;
}

#[async_trait]
impl ActivityExt for DBClient {
    async fn record_activity(
        &self,
        activity: NewActivity,
    ) -> Result<UserActivity, sqlx::Error> {
        sqlx::query_as::<_, UserActivity>(
            r#"
            INSERT INTO user_activities (id, user_id, type, title, registration_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, type, title, registration_number, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(activity.user_id)
        .bind(activity.kind)
        .bind(activity.title)
        .bind(activity.registration_number)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user_activity(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserActivity>, sqlx::Error> {
        sqlx::query_as::<_, UserActivity>(
            r#"
            SELECT id, user_id, type, title, registration_number, created_at
            FROM user_activities
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
