//! Gemini provider implementation for Hekim
//!
//! This module implements the Provider trait against the Google Gemini
//! `generateContent` API. The full conversation history is replayed into the
//! request on every call. Single attempt, no retry, no streaming.

use crate::config::GeminiConfig;
use crate::error::{HekimError, Result};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base when none is configured
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Fixed client-side request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini API provider
///
/// Connects to the Gemini `generateContent` endpoint to produce completions.
/// The API key comes from the `GEMINI_API_KEY` environment variable; the
/// API base is overridable through configuration so tests can point the
/// provider at a mock server.
///
/// # Examples
///
/// ```no_run
/// use hekim::config::GeminiConfig;
/// use hekim::providers::{GeminiProvider, Provider, Message};
///
/// # async fn example() -> hekim::error::Result<()> {
/// let provider = GeminiProvider::new(GeminiConfig::default())?;
/// let messages = vec![Message::user("Merhaba!")];
/// let completion = provider.complete(&messages).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

/// Request structure for the generateContent endpoint
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

/// One turn of conversation in Gemini format
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

/// A single text part within a content entry
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

/// Generation parameters
#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response structure from the generateContent endpoint
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

/// A single completion candidate
#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

/// Token accounting reported by the API
#[derive(Debug, Deserialize, Default)]
struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: usize,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: usize,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration containing model and temperature
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if `GEMINI_API_KEY` is unset, or a
    /// provider error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = crate::config::Config::gemini_api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Create a Gemini provider with an explicit API key
    ///
    /// Used by tests that do not want to touch process environment.
    pub fn with_api_key(config: GeminiConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("hekim/0.1.0")
            .build()
            .map_err(|e| HekimError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Gemini provider: model={}", config.model);

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the generateContent endpoint URL
    fn endpoint(&self) -> String {
        let base = self
            .config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent",
            base, self.config.model
        )
    }

    /// Convert Hekim messages to Gemini contents
    ///
    /// Gemini names the assistant role "model"; everything else maps to
    /// "user", which includes the intro instruction.
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        messages
            .iter()
            .map(|m| GeminiContent {
                role: if m.role == "assistant" {
                    "model".to_string()
                } else {
                    "user".to_string()
                },
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect()
    }

    /// Extract the reply text from a parsed response
    fn extract_reply(response: GeminiResponse) -> Result<CompletionResponse> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            HekimError::Provider("Gemini returned no candidates".to_string())
        })?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let message = Message::assistant(text);
        match response.usage_metadata {
            Some(usage) => Ok(CompletionResponse::with_usage(
                message,
                TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count),
            )),
            None => Ok(CompletionResponse::new(message)),
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = GeminiRequest {
            contents: Self::convert_messages(messages),
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let url = self.endpoint();
        tracing::debug!("Sending {} messages to Gemini", messages.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Gemini request failed: {}", e);
                HekimError::Provider(format!("Failed to reach Gemini API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(HekimError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            HekimError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let completion = Self::extract_reply(parsed)?;
        if let Some(usage) = completion.usage {
            tracing::debug!(
                "Gemini usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider(api_base: Option<String>) -> GeminiProvider {
        let config = GeminiConfig {
            model: "gemini-2.5-flash".to_string(),
            api_base,
            temperature: 0.7,
        };
        GeminiProvider::with_api_key(config, "test-key".to_string()).unwrap()
    }

    #[test]
    fn test_endpoint_default_base() {
        let provider = test_provider(None);
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_endpoint_custom_base_trailing_slash() {
        let provider = test_provider(Some("http://localhost:9999/".to_string()));
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_convert_messages_roles() {
        let messages = vec![
            Message::user("intro"),
            Message::user("Merhaba"),
            Message::assistant("Buyrun"),
        ];
        let contents = GeminiProvider::convert_messages(&messages);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "user");
        assert_eq!(contents[2].role, "model");
        assert_eq!(contents[2].parts[0].text, "Buyrun");
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = GeminiRequest {
            contents: GeminiProvider::convert_messages(&[Message::user("hi")]),
            generation_config: GenerationConfig { temperature: 0.7 },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"contents\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"temperature\":0.7"));
        assert!(json.contains("\"parts\":[{\"text\":\"hi\"}]"));
    }

    #[test]
    fn test_extract_reply_joins_parts() {
        let response = GeminiResponse {
            candidates: vec![GeminiCandidate {
                content: GeminiContent {
                    role: "model".to_string(),
                    parts: vec![
                        GeminiPart {
                            text: "Geçmiş ".to_string(),
                        },
                        GeminiPart {
                            text: "olsun".to_string(),
                        },
                    ],
                },
            }],
            usage_metadata: None,
        };
        let completion = GeminiProvider::extract_reply(response).unwrap();
        assert_eq!(completion.message.content, "Geçmiş olsun");
        assert!(completion.usage.is_none());
    }

    #[test]
    fn test_extract_reply_with_usage() {
        let response = GeminiResponse {
            candidates: vec![GeminiCandidate {
                content: GeminiContent {
                    role: "model".to_string(),
                    parts: vec![GeminiPart {
                        text: "ok".to_string(),
                    }],
                },
            }],
            usage_metadata: Some(GeminiUsageMetadata {
                prompt_token_count: 10,
                candidates_token_count: 5,
            }),
        };
        let completion = GeminiProvider::extract_reply(response).unwrap();
        let usage = completion.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 5);
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn test_extract_reply_no_candidates_is_error() {
        let response = GeminiResponse {
            candidates: vec![],
            usage_metadata: None,
        };
        assert!(GeminiProvider::extract_reply(response).is_err());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Merhaba Ahmet"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 42, "candidatesTokenCount": 7, "totalTokenCount": 49}
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 42);
    }
}
