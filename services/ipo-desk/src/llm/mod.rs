//! Summarizer abstraction for the analysis step.

mod gemini;

pub use gemini::GeminiSummarizer;

use async_trait::async_trait;

/// Summarizer failures. None of these are cached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummarizeError {
    #[error("Gemini API key not found. Set GOOGLE_API_KEY or GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Request to the AI API failed: {0}")]
    Transport(String),

    #[error("AI API error: {0}")]
    Api(String),

    #[error("Failed to parse AI API response: {0}")]
    Malformed(String),

    #[error("AI API returned no analysis")]
    Empty,
}

/// Turns a prompt into analysis text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError>;
}
