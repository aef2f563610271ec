pub mod activitymodel;
pub mod callmodel;
pub mod notificationmodel;
pub mod referralmodel;
pub mod usermodel;
