pub mod activitydb;
pub mod calldb;
pub mod notificationdb;
pub mod referraldb;
pub mod userdb;

#[cfg(test)]
pub mod memory;

use sqlx::{Pool, Postgres};

use activitydb::ActivityExt;
use calldb::CallExt;
use notificationdb::NotificationExt;
use referraldb::ReferralExt;
use userdb::UserExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

/// Everything the services need from persistence, usable as `Arc<dyn Store>`.
pub trait Store: UserExt + CallExt + ReferralExt + NotificationExt + ActivityExt {}

impl<T> Store for T where T: UserExt + CallExt + ReferralExt + NotificationExt + ActivityExt {}
