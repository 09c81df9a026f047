use crate::error::{AppError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// Outcome of checking a password against what is stored for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    Valid,
    /// Matched a legacy plaintext credential.
    ValidLegacy,
    Invalid,
}

impl CredentialCheck {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid | Self::ValidLegacy)
    }
}

/// Decides what happens to legacy plaintext credentials after a successful
/// login.
#[derive(Debug, Clone, Copy)]
pub struct RehashPolicy {
    upgrade_legacy: bool,
}

impl RehashPolicy {
    #[must_use]
    pub const fn new(upgrade_legacy: bool) -> Self {
        Self { upgrade_legacy }
    }

    #[must_use]
    pub const fn should_rehash(&self, check: CredentialCheck) -> bool {
        self.upgrade_legacy && matches!(check, CredentialCheck::ValidLegacy)
    }
}

/// # Errors
/// Returns `AppError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt).map_err(|_| AppError::Internal)?.to_string();
    Ok(password_hash)
}

/// Checks `password` against a stored credential. Anything that does not
/// parse as a PHC string is treated as a legacy plaintext value.
#[must_use]
pub fn check_password(password: &str, stored: &str) -> CredentialCheck {
    match PasswordHash::new(stored) {
        Ok(parsed) => {
            if Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok() {
                CredentialCheck::Valid
            } else {
                CredentialCheck::Invalid
            }
        }
        Err(_) => {
            if bool::from(password.as_bytes().ct_eq(stored.as_bytes())) {
                CredentialCheck::ValidLegacy
            } else {
                CredentialCheck::Invalid
            }
        }
    }
}
