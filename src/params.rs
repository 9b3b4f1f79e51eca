//! Generation request, configuration bundle, and parameter parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Upper bound on the number of images requested in one batch.
pub const MAX_IMAGE_COUNT: u32 = 5;

/// Upper bound accepted for the deterministic seed.
pub const MAX_SEED: u64 = 10_000;

/// Instruction appended to prompts so the model answers with an image and
/// renders any requested lettering legibly.
const IMAGE_ONLY_INSTRUCTION: &str = "Respond with a single generated image only, without any \
     accompanying text. Any text that appears inside the image must be spelled exactly as \
     written in the prompt and rendered clearly and legibly.";

/// Target output resolution accepted by Gemini image models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    /// Roughly 1024px on the long edge.
    #[serde(rename = "1K")]
    OneK,
    /// Roughly 2048px on the long edge.
    #[serde(rename = "2K")]
    TwoK,
    /// Roughly 4096px on the long edge.
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    /// Returns the API value for this size.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneK => "1K",
            Self::TwoK => "2K",
            Self::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "1K" => Ok(Self::OneK),
            "2K" => Ok(Self::TwoK),
            "4K" => Ok(Self::FourK),
            _ => Err(format!("Unsupported size '{s}'. Valid: 1K, 2K, 4K")),
        }
    }
}

/// Sampling parameters forwarded with every generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus-sampling threshold.
    pub top_p: f32,
    /// Top-k cutoff.
    pub top_k: u32,
    /// Output-token cap.
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { temperature: 0.4, top_p: 1.0, top_k: 32, max_output_tokens: 4096 }
    }
}

/// The configuration bundle sent alongside each prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling parameters.
    #[serde(flatten)]
    pub sampling: SamplingConfig,
    /// Optional deterministic seed.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Optional target resolution.
    #[serde(default)]
    pub size: Option<ImageSize>,
}

/// A user's request for a batch of images, built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Natural-language description of the desired image.
    pub prompt: String,
    /// How many images to attempt.
    pub image_count: u32,
    /// Optional deterministic seed.
    pub seed: Option<u64>,
    /// Optional target resolution.
    pub size: Option<ImageSize>,
}

impl GenerationRequest {
    /// Create a request for `image_count` images of `prompt`.
    pub fn new(prompt: impl Into<String>, image_count: u32) -> Self {
        Self { prompt: prompt.into(), image_count, seed: None, size: None }
    }

    /// Set the deterministic seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the target resolution.
    #[must_use]
    pub fn with_size(mut self, size: Option<ImageSize>) -> Self {
        self.size = size;
        self
    }

    /// Check the request's invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the prompt is blank, the image count is
    /// outside `1..=MAX_IMAGE_COUNT`, or the seed exceeds `MAX_SEED`.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::InvalidArgument("Prompt must not be empty".into()));
        }
        if !(1..=MAX_IMAGE_COUNT).contains(&self.image_count) {
            return Err(GenerationError::InvalidArgument(format!(
                "Image count must be between 1 and {MAX_IMAGE_COUNT}, got {}",
                self.image_count
            )));
        }
        if let Some(seed) = self.seed {
            if seed > MAX_SEED {
                return Err(GenerationError::InvalidArgument(format!(
                    "Seed must be between 0 and {MAX_SEED}, got {seed}"
                )));
            }
        }
        Ok(())
    }
}

/// Append the image-only instruction to a prompt.
#[must_use]
pub fn augment_prompt(prompt: &str) -> String {
    format!("{}\n\n{IMAGE_ONLY_INSTRUCTION}", prompt.trim())
}

/// Parse the output format parameter.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn parse_format(format: &str) -> Result<image::ImageFormat, String> {
    match format {
        "png" => Ok(image::ImageFormat::Png),
        "jpeg" | "jpg" => Ok(image::ImageFormat::Jpeg),
        "webp" => Ok(image::ImageFormat::WebP),
        _ => Err(format!("Unsupported format '{format}'. Valid: png, jpeg, webp")),
    }
}

/// Get the file extension for an output format.
#[must_use]
pub fn format_extension(format: image::ImageFormat) -> &'static str {
    match format {
        image::ImageFormat::Jpeg => "jpg",
        image::ImageFormat::WebP => "webp",
        // png and any other format fall back to png
        _ => "png",
    }
}
