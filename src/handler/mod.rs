pub mod calls;
pub mod notifications;
pub mod users;
