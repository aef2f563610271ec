pub mod activity_service;
pub mod background;
pub mod call_service;
pub mod error;
pub mod fcm;
pub mod notification_service;
pub mod referral;
pub mod signaling;
pub mod translations;
