use crate::adapters::database::DbPool;
use crate::adapters::database::user_repo::UserRepository;
use crate::core::auth::{self, CredentialCheck, RehashPolicy};
use crate::domain::user::{Mobile, User};
use crate::error::{AppError, Result};
use opentelemetry::{KeyValue, global, metrics::Counter};

#[derive(Clone, Debug)]
struct AccountMetrics {
    users_registered_total: Counter<u64>,
    logins_total: Counter<u64>,
    legacy_passwords_rehashed_total: Counter<u64>,
}

impl AccountMetrics {
    fn new() -> Self {
        let meter = global::meter("chatter-server");
        Self {
            users_registered_total: meter
                .u64_counter("users_registered_total")
                .with_description("Total number of successful user registrations")
                .build(),
            logins_total: meter.u64_counter("logins_total").with_description("Login attempts by outcome").build(),
            legacy_passwords_rehashed_total: meter
                .u64_counter("legacy_passwords_rehashed_total")
                .with_description("Legacy plaintext credentials upgraded to argon2 on login")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AccountService {
    pool: DbPool,
    repo: UserRepository,
    rehash_policy: RehashPolicy,
    metrics: AccountMetrics,
}

impl AccountService {
    #[must_use]
    pub fn new(pool: DbPool, repo: UserRepository, rehash_policy: RehashPolicy) -> Self {
        Self { pool, repo, rehash_policy, metrics: AccountMetrics::new() }
    }

    /// Creates an account with a hashed password.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for missing fields and
    /// `AppError::Conflict` when the username or mobile is already taken.
    #[tracing::instrument(skip(self, username, password), fields(user_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn signup(&self, username: &str, mobile: Mobile, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest("Username, mobile number, and password are required".into()));
        }

        let mut conn = self.pool.acquire().await?;
        if self.repo.exists_with(&mut conn, username, mobile.value()).await? {
            return Err(AppError::Conflict("User with this username or mobile number already exists".into()));
        }

        let password_hash = hash_blocking(password).await?;
        // The unique constraints still catch a concurrent signup for the same identity.
        let user = self.repo.create(&mut conn, username, mobile.value(), &password_hash).await?;

        tracing::Span::current().record("user_id", tracing::field::display(user.id));
        tracing::info!("User registered successfully");
        self.metrics.users_registered_total.add(1, &[]);

        Ok(user)
    }

    /// Authenticates by mobile number and password.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for an unknown mobile or a wrong password;
    /// the two are indistinguishable to the caller.
    #[tracing::instrument(skip(self, password), fields(user_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn login(&self, mobile: Mobile, password: &str) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        let Some(user) = self.repo.find_by_mobile(&mut conn, mobile.value()).await? else {
            self.metrics.logins_total.add(1, &[KeyValue::new("status", "unknown_user")]);
            return Err(AppError::AuthError);
        };
        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        let check = check_blocking(password, &user.password_hash).await?;
        if !check.is_valid() {
            self.metrics.logins_total.add(1, &[KeyValue::new("status", "invalid_password")]);
            return Err(AppError::AuthError);
        }

        if self.rehash_policy.should_rehash(check) {
            self.upgrade_legacy_credential(&mut conn, &user, password).await;
        }

        self.metrics.logins_total.add(1, &[KeyValue::new("status", "success")]);
        Ok(user)
    }

    async fn upgrade_legacy_credential(&self, conn: &mut sqlx::PgConnection, user: &User, password: &str) {
        let result = match hash_blocking(password).await {
            Ok(new_hash) => self.repo.replace_password_hash(conn, user.id, &user.password_hash, &new_hash).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => {
                tracing::info!(target: "audit", user_id = %user.id, event = "password_rehashed", "Legacy plaintext password upgraded to argon2");
                self.metrics.legacy_passwords_rehashed_total.add(1, &[]);
            }
            Ok(false) => {
                tracing::debug!(user_id = %user.id, "Credential changed concurrently, skipping rehash");
            }
            Err(e) => {
                // Login already succeeded; the upgrade is retried on the next one.
                tracing::warn!(user_id = %user.id, error = %e, "Failed to upgrade legacy password");
            }
        }
    }
}

async fn hash_blocking(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || auth::hash_password(&password)).await.map_err(|_| AppError::Internal)?
}

async fn check_blocking(password: &str, stored: &str) -> Result<CredentialCheck> {
    let password = password.to_string();
    let stored = stored.to_string();
    tokio::task::spawn_blocking(move || auth::check_password(&password, &stored)).await.map_err(|_| AppError::Internal)
}
