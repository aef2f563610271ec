use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use crate::{
    db::Store,
    models::activitymodel::{NewActivity, UserActivity},
    service::{background::BackgroundTasks, error::ServiceError},
};

/// Append-only activity log. Writes are detached; a failed write is logged
/// and dropped.
#[derive(Clone)]
pub struct ActivityService {
    db_client: Arc<dyn Store>,
    tasks: BackgroundTasks,
}

impl ActivityService {
    pub fn new(db_client: Arc<dyn Store>, tasks: BackgroundTasks) -> Self {
        Self { db_client, tasks }
    }

    pub fn record(&self, activity: NewActivity) {
        self.record_many(vec![activity]);
    }

    /// Writes all entries concurrently on one detached task.
    pub fn record_many(&self, activities: Vec<NewActivity>) {
        if activities.is_empty() {
            return;
        }

        let db_client = self.db_client.clone();
        self.tasks.spawn(async move {
            let writes = activities.into_iter().map(|activity| {
                let db_client = db_client.clone();
                async move {
                    let user_id = activity.user_id;
                    let kind = activity.kind;
                    if let Err(e) = db_client.record_activity(activity).await {
                        tracing::error!("Failed to record {:?} activity for {}: {}", kind, user_id, e);
                    }
                }
            });
            join_all(writes).await;
        });
    }

    pub async fn get_user_activity(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserActivity>, ServiceError> {
        Ok(self.db_client.get_user_activity(user_id, limit, offset).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::activitymodel::ActivityType, testing::Harness};

    #[tokio::test]
    async fn records_entries_in_the_background() {
        let h = Harness::new();
        let activity = ActivityService::new(h.db(), h.tasks.clone());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        activity.record_many(vec![
            NewActivity::new(a, ActivityType::Call, "Call"),
            NewActivity::new(b, ActivityType::ReceivedCall, "Received call"),
        ]);
        activity.record(NewActivity::new(a, ActivityType::Alert, "Alert").with_registration("MH12AB1234"));
        h.tasks.drain().await;

        let stored = h.store.activities().await;
        assert_eq!(stored.len(), 3);

        let page = activity.get_user_activity(a, 10, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].kind, ActivityType::Alert);
        assert_eq!(page[0].registration_number.as_deref(), Some("MH12AB1234"));
    }

    #[tokio::test]
    async fn empty_batch_spawns_nothing() {
        let h = Harness::new();
        let activity = ActivityService::new(h.db(), h.tasks.clone());

        activity.record_many(vec![]);
        h.tasks.drain().await;

        assert!(h.store.activities().await.is_empty());
    }
}
