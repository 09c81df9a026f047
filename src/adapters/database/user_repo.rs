use crate::adapters::database::records::{UserProfileRecord, UserRecord};
use crate::domain::user::{User, UserProfile};
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone, Debug, Default)]
pub struct UserRepository {}

impl UserRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Inserts a new user.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if the username or mobile is taken.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, password_hash))]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        username: &str,
        mobile: i64,
        password_hash: &str,
    ) -> Result<User> {
        let result = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, username, mobile, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, mobile, password_hash, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(username)
        .bind(mobile)
        .bind(password_hash)
        .fetch_one(conn)
        .await;

        match result {
            Ok(record) => Ok(record.into()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::Conflict("User with this username or mobile number already exists".into()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn exists_with(&self, conn: &mut PgConnection, username: &str, mobile: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR mobile = $2)")
                .bind(username)
                .bind(mobile)
                .fetch_one(conn)
                .await?;
        Ok(exists)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_by_mobile(&self, conn: &mut PgConnection, mobile: i64) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, mobile, password_hash, created_at
            FROM users
            WHERE mobile = $1
            "#,
        )
        .bind(mobile)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_profile(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Option<UserProfile>> {
        let record = sqlx::query_as::<_, UserProfileRecord>("SELECT id, username, mobile FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn count_existing(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(conn)
            .await?;
        Ok(count)
    }

    /// Replaces a stored credential, only if it still holds `expected`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn, expected, new_hash))]
    pub(crate) async fn replace_password_hash(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        expected: &str,
        new_hash: &str,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $3 WHERE id = $1 AND password_hash = $2")
            .bind(user_id)
            .bind(expected)
            .bind(new_hash)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// All users except `exclude`, ordered by username.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list_profiles(
        &self,
        conn: &mut PgConnection,
        exclude: Option<Uuid>,
    ) -> Result<Vec<UserProfile>> {
        let records = sqlx::query_as::<_, UserProfileRecord>(
            r#"
            SELECT id, username, mobile
            FROM users
            WHERE $1::uuid IS NULL OR id <> $1
            ORDER BY username ASC
            "#,
        )
        .bind(exclude)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive substring match on username, plus an exact mobile
    /// match when one is given.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn search_profiles(
        &self,
        conn: &mut PgConnection,
        query: &str,
        mobile: Option<i64>,
        exclude: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<UserProfile>> {
        let pattern = format!("%{}%", escape_like(query));
        let records = sqlx::query_as::<_, UserProfileRecord>(
            r#"
            SELECT id, username, mobile
            FROM users
            WHERE (username ILIKE $1 ESCAPE '\' OR ($2::bigint IS NOT NULL AND mobile = $2))
              AND ($3::uuid IS NULL OR id <> $3)
            ORDER BY username ASC
            LIMIT $4
            "#,
        )
        .bind(pattern)
        .bind(mobile)
        .bind(exclude)
        .bind(limit)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
