pub mod chat_completions;

use crate::config::ModerationConfig;
use crate::core::moderation::{ContentModerator, DisabledModerator};
use std::sync::Arc;

/// Picks the moderator implementation for this process.
///
/// # Errors
/// Returns an error when moderation is enabled without an API key, or the HTTP
/// client cannot be built.
pub fn from_config(config: &ModerationConfig) -> anyhow::Result<Arc<dyn ContentModerator>> {
    if !config.enabled {
        tracing::info!("Content moderation disabled");
        return Ok(Arc::new(DisabledModerator));
    }

    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("moderation is enabled but no API key is configured"))?;

    tracing::info!(model = %config.model, endpoint = %config.endpoint, "Content moderation enabled");
    Ok(Arc::new(chat_completions::ChatCompletionsModerator::new(
        config.endpoint.clone(),
        api_key,
        config.model.clone(),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool, api_key: Option<&str>) -> ModerationConfig {
        ModerationConfig {
            enabled,
            api_key: api_key.map(str::to_string),
            model: "llama-3.1-8b-instant".into(),
            endpoint: "http://127.0.0.1:9/v1/chat/completions".into(),
            timeout_ms: 1000,
        }
    }

    #[test]
    fn test_disabled_by_default() {
        let moderator = from_config(&config(false, None)).unwrap();
        assert!(!moderator.is_enabled());
    }

    #[test]
    fn test_enabled_requires_key() {
        assert!(from_config(&config(true, None)).is_err());
        assert!(from_config(&config(true, Some("  "))).is_err());
        assert!(from_config(&config(true, Some("k"))).unwrap().is_enabled());
    }
}
