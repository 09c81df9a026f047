use crate::adapters::database::DbPool;
use crate::adapters::database::user_repo::UserRepository;
use crate::domain::user::UserProfile;
use crate::error::{AppError, Result};
use uuid::Uuid;

pub const SEARCH_LIMIT: i64 = 10;

/// Read-only user directory: listing and contact search.
#[derive(Clone, Debug)]
pub struct UserService {
    pool: DbPool,
    repo: UserRepository,
}

impl UserService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: UserRepository) -> Self {
        Self { pool, repo }
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self, exclude: Option<Uuid>) -> Result<Vec<UserProfile>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_profiles(&mut conn, exclude).await
    }

    /// Finds up to ten users whose username contains `query`, or whose mobile
    /// equals it when `query` is all digits.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if the query is blank.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn search(&self, query: &str, exclude: Option<Uuid>) -> Result<Vec<UserProfile>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Search query is required".into()));
        }

        let mobile = mobile_query(query);
        let mut conn = self.pool.acquire().await?;
        self.repo.search_profiles(&mut conn, query, mobile, exclude, SEARCH_LIMIT).await
    }
}

fn mobile_query(query: &str) -> Option<i64> {
    if query.bytes().all(|b| b.is_ascii_digit()) { query.parse().ok() } else { None }
}
