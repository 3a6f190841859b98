//! Google Gemini summarizer.
//!
//! API key resolution:
//! 1. Explicit key (config `secrets.google`)
//! 2. `GEMINI_API_KEY` environment variable
//! 3. `GOOGLE_API_KEY` environment variable

use super::{SummarizeError, Summarizer};
use async_trait::async_trait;
use ipo_common::LlmConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub struct GeminiSummarizer {
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f64,
    max_output_tokens: i64,
    client: Client,
}

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: i64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<i64>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<i64>,
}

impl GeminiSummarizer {
    pub fn new(api_key: Option<&str>, config: &LlmConfig) -> Self {
        let resolved_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        Self {
            api_key: resolved_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        let model_name = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/v1beta/{model_name}:generateContent", self.base_url)
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError> {
        let start = Instant::now();
        let api_key = self.api_key.as_ref().ok_or(SummarizeError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
                .map(|env| env.error.message)
                .unwrap_or(error_text);
            return Err(SummarizeError::Api(format!(
                "{} ({})",
                message.trim(),
                status.as_u16()
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Malformed(e.without_url().to_string()))?;

        if let Some(err) = result.error {
            return Err(SummarizeError::Api(err.message));
        }

        let candidate = result
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or(SummarizeError::Empty)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        let text = text.trim();

        if text.is_empty() {
            return Err(SummarizeError::Empty);
        }

        let (input_tokens, output_tokens) = result.usage_metadata.map_or((0, 0), |u| {
            (
                u.prompt_token_count.unwrap_or(0),
                u.candidates_token_count.unwrap_or(0),
            )
        });

        tracing::info!(
            model = %self.model,
            input_tokens,
            output_tokens,
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            latency_ms = start.elapsed().as_millis() as u64,
            "Analysis generated"
        );

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            base_url: server.uri(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn summarizer_uses_explicit_key() {
        let summarizer = GeminiSummarizer::new(Some("test-api-key"), &LlmConfig::default());
        assert_eq!(summarizer.api_key.as_deref(), Some("test-api-key"));
        assert_eq!(summarizer.name(), "gemini");
        assert_eq!(summarizer.model(), "gemini-2.5-flash");
    }

    #[test]
    fn endpoint_includes_model() {
        let summarizer = GeminiSummarizer::new(Some("k"), &LlmConfig::default());
        assert_eq!(
            summarizer.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn summarize_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "analyze this"}]}],
                "generationConfig": {"temperature": 0.4}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "  **Final Verdict:**\nBased on the available data... "}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::new(Some("secret"), &config_for(&server));
        let text = summarizer.summarize("analyze this").await.unwrap();
        assert_eq!(text, "**Final Verdict:**\nBased on the available data...");
    }

    #[tokio::test]
    async fn summarize_surfaces_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::new(Some("secret"), &config_for(&server));
        let err = summarizer.summarize("x").await.unwrap_err();
        assert_eq!(err, SummarizeError::Api("Quota exceeded (429)".to_string()));
    }

    #[tokio::test]
    async fn summarize_rejects_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::new(Some("secret"), &config_for(&server));
        assert_eq!(
            summarizer.summarize("x").await.unwrap_err(),
            SummarizeError::Empty
        );
    }

    #[tokio::test]
    async fn summarize_without_key_fails_fast() {
        let summarizer = GeminiSummarizer {
            api_key: None,
            ..GeminiSummarizer::new(Some("unused"), &LlmConfig::default())
        };
        assert_eq!(
            summarizer.summarize("x").await.unwrap_err(),
            SummarizeError::MissingApiKey
        );
    }
}
