use crate::core::moderation::ContentModerator;
use crate::domain::moderation::{DEFAULT_REJECTION_REASON, MediaSample, Verdict};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const SYSTEM_PROMPT: &str =
    "You are a content moderation AI that analyzes images and videos for inappropriate content. Always respond with valid JSON.";
const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.1;

fn classification_prompt(family: &str) -> String {
    format!(
        "You are a content moderation system. Analyze this {family} and determine if it contains any of the following inappropriate content:

1. Adult content, nudity, or sexual material
2. Violence, gore, or bloody content
3. Abusive, hateful, or offensive material
4. Illegal activities or dangerous content
5. Graphic or disturbing imagery

Please respond with ONLY a JSON object in this exact format:
{{
  \"isAppropriate\": true/false,
  \"reason\": \"brief explanation if inappropriate, or null if appropriate\"
}}

The {family} data is provided in base64 format. Be thorough in your analysis and err on the side of caution for user safety."
    )
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelVerdict {
    is_appropriate: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Moderator backed by an OpenAI-compatible chat-completions endpoint with
/// vision input.
#[derive(Debug, Clone)]
pub struct ChatCompletionsModerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsModerator {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: String, api_key: String, model: String) -> Result<Self, reqwest::Error> {
        // The caller bounds the whole call, so only connecting is limited here.
        let client = reqwest::Client::builder().connect_timeout(Duration::from_secs(5)).build()?;
        Ok(Self { client, endpoint, api_key, model })
    }

    async fn classify(&self, sample: MediaSample<'_>) -> Result<Verdict, String> {
        let family = sample.family();
        let encoded = base64::engine::general_purpose::STANDARD.encode(sample.bytes);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": classification_prompt(family) },
                        {
                            "type": "image_url",
                            "image_url": { "url": format!("data:{};base64,{}", sample.mime_type, encoded) }
                        }
                    ]
                }
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("backend returned {status}"));
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|e| format!("malformed completion: {e}"))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| "no completion content".to_string())?;

        parse_verdict(&content)
    }
}

/// Interprets the model's reply. Anything but the strict JSON verdict is an
/// error.
fn parse_verdict(content: &str) -> Result<Verdict, String> {
    let verdict: ModelVerdict =
        serde_json::from_str(content.trim()).map_err(|e| format!("unparsable verdict: {e}"))?;

    if verdict.is_appropriate {
        return Ok(Verdict::Appropriate);
    }

    let reason = verdict.reason.filter(|r| !r.trim().is_empty()).unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
    Ok(Verdict::Inappropriate { reason: Some(reason) })
}

#[async_trait]
impl ContentModerator for ChatCompletionsModerator {
    #[tracing::instrument(skip(self, sample), fields(mime_type = %sample.mime_type, size = sample.bytes.len()))]
    async fn moderate(&self, sample: MediaSample<'_>) -> Verdict {
        if !sample.needs_screening() {
            return Verdict::Appropriate;
        }

        match self.classify(sample).await {
            Ok(verdict) => {
                tracing::debug!(verdict = verdict.label(), "Moderation verdict received");
                verdict
            }
            Err(e) => {
                tracing::warn!(error = %e, "Moderation backend unavailable, blocking upload");
                Verdict::unavailable()
            }
        }
    }
}
