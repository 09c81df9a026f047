pub mod chats;
pub mod health;
pub mod messages;
pub mod uploads;
pub mod users;
