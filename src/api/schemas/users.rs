use crate::domain::user::{Mobile, User, UserProfile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct Signup {
    pub username: Option<String>,
    pub mobile: Option<Mobile>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub mobile: Option<Mobile>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub current_user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchUsersQuery {
    pub q: Option<String>,
    pub current_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSchema {
    pub id: Uuid,
    pub username: String,
    pub mobile: i64,
}

impl From<UserProfile> for UserSchema {
    fn from(profile: UserProfile) -> Self {
        Self { id: profile.id, username: profile.username, mobile: profile.mobile }
    }
}

impl From<&User> for UserSchema {
    fn from(user: &User) -> Self {
        user.profile().into()
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserSchema,
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserSchema>,
}
