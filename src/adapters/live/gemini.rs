//! Live adapter for the Gemini `generateContent` API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::params::GenerationConfig;
use crate::ports::image_generator::{
    ContentRequest, ContentResponse, GenerateFuture, ImageGenerator, InlineData, ResponsePart,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Longest slice of a response body quoted in an error message.
const MAX_ERROR_BODY: usize = 500;

/// Live Gemini generator that calls the Google AI API.
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
}

impl GeminiGenerator {
    /// Create a generator against the public Gemini endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(GEMINI_API_BASE)
    }

    /// Create a generator against another host serving the same API.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), base_url }
    }
}

impl Default for GeminiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageGenerator for GeminiGenerator {
    fn generate(&self, request: &ContentRequest, credential: &str) -> GenerateFuture<'_> {
        let request = request.clone();
        let credential = credential.to_string();
        Box::pin(async move {
            let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, request.model);
            let body = GeminiRequest::from_content_request(&request);

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &credential)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    message: truncate(&response_text),
                });
            }

            let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
                GenerationError::Api {
                    status: status.as_u16(),
                    message: format!("Failed to parse response: {e}"),
                }
            })?;

            if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    message: format!("Prompt blocked: {reason}"),
                });
            }

            let parts = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|c| c.parts)
                .unwrap_or_default()
                .into_iter()
                .map(|part| ResponsePart {
                    text: part.text,
                    inline_data: part
                        .inline_data
                        .map(|d| InlineData { mime_type: d.mime_type, data: d.data }),
                })
                .collect();

            Ok(ContentResponse { parts })
        })
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

// --- Gemini API request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiRequestContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiRequestContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_modalities: Vec<&'static str>,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<GeminiImageConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    image_size: &'static str,
}

impl GeminiRequest {
    fn from_content_request(request: &ContentRequest) -> Self {
        let GenerationConfig { sampling, seed, size } = &request.config;
        Self {
            contents: vec![GeminiRequestContent {
                parts: vec![GeminiTextPart { text: request.prompt.clone() }],
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                top_k: sampling.top_k,
                max_output_tokens: sampling.max_output_tokens,
                seed: *seed,
                image_config: size.map(|s| GeminiImageConfig { image_size: s.as_str() }),
            },
        }
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
