pub mod account_service;
pub mod auth;
pub mod chat_service;
pub mod health_service;
pub mod message_service;
pub mod moderation;
pub mod transcoder;
pub mod upload_service;
pub mod user_service;
