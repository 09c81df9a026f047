use crate::domain::message::PopulatedMessage;
use crate::domain::user::UserProfile;
use time::OffsetDateTime;
use uuid::Uuid;

/// The two participants of a direct chat in canonical (sorted) order.
///
/// Sorting makes the pair's identity independent of who opened the chat, so
/// `(a, b)` and `(b, a)` always resolve to the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    first: Uuid,
    second: Uuid,
}

impl ParticipantPair {
    /// Builds the canonical pair.
    ///
    /// # Errors
    /// Returns a message when both ids are the same user.
    pub fn new(a: Uuid, b: Uuid) -> Result<Self, String> {
        if a == b {
            return Err("Cannot open a chat with yourself".to_string());
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    /// Rebuilds a pair that was already stored in canonical order.
    pub(crate) const fn from_stored(first: Uuid, second: Uuid) -> Self {
        Self { first, second }
    }

    #[must_use]
    pub const fn first(&self) -> Uuid {
        self.first
    }

    #[must_use]
    pub const fn second(&self) -> Uuid {
        self.second
    }

    #[must_use]
    pub fn contains(&self, user_id: Uuid) -> bool {
        self.first == user_id || self.second == user_id
    }

    #[must_use]
    pub const fn as_array(&self) -> [Uuid; 2] {
        [self.first, self.second]
    }
}

#[derive(Debug, Clone)]
pub struct Chat {
    pub id: Uuid,
    pub participants: ParticipantPair,
    pub last_message: Option<String>,
    pub last_message_time: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
}

impl Chat {
    #[must_use]
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(user_id)
    }
}

/// A chat with both participants' public profiles, as listed on the dashboard.
#[derive(Debug, Clone)]
pub struct ChatView {
    pub chat: Chat,
    pub participants: [UserProfile; 2],
}

/// A chat with its full ascending message history.
#[derive(Debug, Clone)]
pub struct ChatThread {
    pub view: ChatView,
    pub messages: Vec<PopulatedMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(ParticipantPair::new(a, b).unwrap(), ParticipantPair::new(b, a).unwrap());
    }

    #[test]
    fn test_pair_is_sorted() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pair = ParticipantPair::new(a, b).unwrap();
        assert!(pair.first() < pair.second());
        assert!(pair.contains(a));
        assert!(pair.contains(b));
        assert!(!pair.contains(Uuid::new_v4()));
    }

    #[test]
    fn test_pair_rejects_self_chat() {
        let a = Uuid::new_v4();
        assert!(ParticipantPair::new(a, a).is_err());
    }
}
