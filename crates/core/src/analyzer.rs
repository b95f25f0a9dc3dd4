use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::{Result, TubecheckError},
    text::{MAX_TRANSCRIPT_CHARS, truncate_chars},
};

static MODERATOR_SYSTEM_PROMPT: &str = "You are an expert content moderator analyzing video transcripts for toxicity, bias, and misinformation. Be objective and thorough.";

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 1000;

/// Prefix of the in-band message that replaces the analysis when the service fails.
pub const ANALYSIS_ERROR_PREFIX: &str = "Error analyzing content: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a chat completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Text of the first returned choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CompletionService for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_completion(status, &body)
    }
}

const ERROR_BODY_PREVIEW_CHARS: usize = 300;

/// Turn a chat completion response into the first choice's text.
///
/// The status is checked before the body is decoded, so non-JSON error pages
/// still report it.
pub fn parse_completion(status: StatusCode, body: &str) -> Result<String> {
    let parsed = serde_json::from_str::<Value>(body);

    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| truncate_chars(body.trim(), ERROR_BODY_PREVIEW_CHARS).to_string());
        return Err(TubecheckError::AnalysisService {
            reason: format!("{status}: {message}"),
        });
    }

    let value = parsed.map_err(|err| TubecheckError::AnalysisService {
        reason: format!(
            "{status} with a body that is not JSON ({err}): {}",
            truncate_chars(body.trim(), ERROR_BODY_PREVIEW_CHARS)
        ),
    })?;

    value["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TubecheckError::AnalysisService {
            reason: format!("Invalid API response: {:?}", value),
        })
}

/// Build the moderation prompt around the first 4000 characters of the transcript.
pub fn build_prompt(transcript_text: &str) -> String {
    format!(
        r#"Analyze the following YouTube video transcript for:

1. **Toxicity**: Check for hate speech, harassment, profanity, threats, or harmful content
2. **Bias**: Identify any political, cultural, gender, racial, or ideological biases
3. **Misinformation**: Look for false claims, misleading statements, or unverified facts

Transcript:
{transcript}

Please provide:
- A toxicity score (0-10, where 10 is highly toxic)
- A bias assessment (types of bias detected and severity)
- A misinformation assessment (potential false claims identified)
- An overall summary

Format your response as a structured analysis."#,
        transcript = truncate_chars(transcript_text, MAX_TRANSCRIPT_CHARS)
    )
}

pub fn build_request(model: &str, transcript_text: &str) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(MODERATOR_SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(transcript_text)),
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

/// Asks the completion service for a moderation assessment.
pub struct ContentAnalyzer<C> {
    service: C,
    model: String,
}

impl<C: CompletionService> ContentAnalyzer<C> {
    pub fn new(service: C, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }

    /// Never fails: service errors come back as an `Error analyzing content: ...` string.
    pub async fn analyze(&self, transcript_text: &str, video_id: &str) -> String {
        let request = build_request(&self.model, transcript_text);
        match self.service.complete(&request).await {
            Ok(analysis) => {
                info!(video_id, model = %self.model, chars = analysis.len(), "analysis received");
                analysis
            }
            Err(err) => {
                warn!(video_id, model = %self.model, error = %err, "analysis service failed");
                format!("{ANALYSIS_ERROR_PREFIX}{err}")
            }
        }
    }
}
