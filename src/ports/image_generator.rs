//! Image generator port for the external text-to-image capability.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::params::GenerationConfig;

/// A single call to the external text-to-image capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    /// The resolved model identifier (e.g., `"gemini-2.5-flash-image"`).
    pub model: String,
    /// Prompt text as sent, including any appended instructions.
    pub prompt: String,
    /// Sampling, seed, and size settings.
    pub config: GenerationConfig,
}

/// Base64 image payload carried inline in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    /// MIME type of the payload (e.g., `"image/png"`).
    pub mime_type: String,
    /// Base64-encoded image bytes, left encoded until the adapter decodes them.
    pub data: String,
}

/// One fragment of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePart {
    /// Text emitted by the model, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline binary data, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// The parts returned by one call, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponse {
    /// Response fragments.
    pub parts: Vec<ResponsePart>,
}

impl ContentResponse {
    /// Returns the first part carrying inline data.
    #[must_use]
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.parts.iter().find_map(|part| part.inline_data.as_ref())
    }
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ContentResponse, GenerationError>> + Send + 'a>>;

/// Invokes an external text-to-image capability.
pub trait ImageGenerator: Send + Sync {
    /// Issue one generation call authorized by `credential`.
    fn generate(&self, request: &ContentRequest, credential: &str) -> GenerateFuture<'_>;
}
