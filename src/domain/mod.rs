pub mod chat;
pub mod media;
pub mod message;
pub mod moderation;
pub mod user;
