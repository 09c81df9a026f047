use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub mobile: i64,
    pub(crate) password_hash: String,
    pub created_at: Option<OffsetDateTime>,
}

impl User {
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile { id: self.id, username: self.username.clone(), mobile: self.mobile }
    }
}

/// The public view of a user; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub mobile: i64,
}

/// A mobile number in its single canonical representation.
///
/// Clients send either a JSON number or a digit string; both are normalized
/// here so storage and lookups only ever see an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mobile(i64);

impl Mobile {
    /// Parses a mobile number from its textual form.
    ///
    /// # Errors
    /// Returns a message if the input is empty or not made of digits.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err("Mobile number must contain only digits".to_string());
        }
        digits.parse::<i64>().map(Self).map_err(|_| "Mobile number is too long".to_string())
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Mobile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) if n >= 0 => Ok(Self(n)),
            Raw::Number(_) => Err(serde::de::Error::custom("Mobile number must not be negative")),
            Raw::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}
