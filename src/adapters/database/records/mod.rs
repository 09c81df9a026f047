pub mod chat;
pub mod message;
pub mod user;

pub use chat::{ChatRecord, ChatViewRecord};
pub use message::{MessageRecord, PopulatedMessageRecord};
pub use user::{UserProfileRecord, UserRecord};
