use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::notificationmodel::{NewNotification, Notification, ReadOutcome};

const NOTIFICATION_COLUMNS: &str = r#"
    id, user_id, sender_id, type, title, body,
    is_read, registration_number, created_at, updated_at
"#;

#[async_trait]
pub trait NotificationExt: Send + Sync {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, sqlx::Error>;

    /// Marks the notification read if it belongs to `user_id`.
    /// `None` when no such notification exists for that user.
    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReadOutcome>, sqlx::Error>;

    async fn get_user_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (id, user_id, sender_id, type, title, body, registration_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.sender_id)
        .bind(notification.kind)
        .bind(notification.title)
        .bind(notification.body)
        .bind(notification.registration_number)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReadOutcome>, sqlx::Error> {
        let flipped = sqlx::query_as::<_, Notification>(&format!(
            r#"
            UPDATE notifications
            SET is_read = true, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_read = false
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(notification) = flipped {
            return Ok(Some(ReadOutcome::MarkedRead(notification)));
        }

        let existing = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications WHERE id = $1 AND user_id = $2",
            NOTIFICATION_COLUMNS
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(existing.map(ReadOutcome::AlreadyRead))
    }

    async fn get_user_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use sqlx::PgPool;

    use crate::{models::notificationmodel::NotificationKind, testing};

    async fn alert_for(db: &DBClient, owner: Uuid, sender: Uuid) -> Notification {
        db.create_notification(NewNotification {
            user_id: owner,
            sender_id: Some(sender),
            kind: NotificationKind::AlertHigh,
            title: "High Priority Alert".to_string(),
            body: "You have received a high priority alert regarding your vehicle.".to_string(),
            registration_number: Some("MH12AB1234".to_string()),
        })
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn first_read_marks_and_later_reads_report_already_read(pool: PgPool) {
        let db = DBClient::new(pool.clone());
        let owner = testing::insert_user_row(&pool, "OWN001").await;
        let sender = testing::insert_user_row(&pool, "SND001").await;
        let alert = alert_for(&db, owner, sender).await;
        assert!(!alert.is_read);

        let first = db.mark_notification_read(alert.id, owner).await.unwrap();
        assert!(matches!(first, Some(ReadOutcome::MarkedRead(ref n)) if n.is_read));

        let second = db.mark_notification_read(alert.id, owner).await.unwrap();
        assert!(matches!(second, Some(ReadOutcome::AlreadyRead(ref n)) if n.is_read));

        assert!(db.mark_notification_read(alert.id, sender).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn concurrent_reads_mark_once(pool: PgPool) {
        let db = DBClient::new(pool.clone());
        let owner = testing::insert_user_row(&pool, "OWN002").await;
        let sender = testing::insert_user_row(&pool, "SND002").await;
        let alert_id = alert_for(&db, owner, sender).await.id;

        let reads = (0..8).map(|_| {
            let db = db.clone();
            tokio::spawn(async move { db.mark_notification_read(alert_id, owner).await.unwrap() })
        });
        let marked = join_all(reads)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(Some(ReadOutcome::MarkedRead(_)))))
            .count();

        assert_eq!(marked, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn notifications_are_paged_newest_first(pool: PgPool) {
        let db = DBClient::new(pool.clone());
        let owner = testing::insert_user_row(&pool, "OWN003").await;
        let sender = testing::insert_user_row(&pool, "SND003").await;
        let older = alert_for(&db, owner, sender).await;
        let newer = alert_for(&db, owner, sender).await;

        let page = db.get_user_notifications(owner, 1, 0).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, newer.id);

        let next = db.get_user_notifications(owner, 1, 1).await.unwrap();
        assert_eq!(next[0].id, older.id);
    }
}
