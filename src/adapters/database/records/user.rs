use crate::domain::user::{User, UserProfile};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) mobile: i64,
    pub(crate) password_hash: String,
    pub(crate) created_at: Option<OffsetDateTime>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            mobile: record.mobile,
            password_hash: record.password_hash,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserProfileRecord {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) mobile: i64,
}

impl From<UserProfileRecord> for UserProfile {
    fn from(record: UserProfileRecord) -> Self {
        Self { id: record.id, username: record.username, mobile: record.mobile }
    }
}
