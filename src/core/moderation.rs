use crate::domain::moderation::{MediaSample, Verdict};
use async_trait::async_trait;

/// Screens uploaded media before it is stored.
///
/// Implementations never fail: any problem reaching a backend must come back
/// as [`Verdict::Unavailable`].
#[async_trait]
pub trait ContentModerator: Send + Sync + std::fmt::Debug {
    async fn moderate(&self, sample: MediaSample<'_>) -> Verdict;

    /// Whether uploads should wait on this moderator at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Approves everything. Used when moderation is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledModerator;

#[async_trait]
impl ContentModerator for DisabledModerator {
    async fn moderate(&self, _sample: MediaSample<'_>) -> Verdict {
        Verdict::Appropriate
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_moderator_approves() {
        let moderator = DisabledModerator;
        let sample = MediaSample { bytes: b"\x89PNG", mime_type: "image/png", file_name: "a.png" };
        assert_eq!(moderator.moderate(sample).await, Verdict::Appropriate);
        assert!(!moderator.is_enabled());
    }
}
