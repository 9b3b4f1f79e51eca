//! Prompt-to-image request adapter.
//!
//! Turns one [`GenerationRequest`] into `image_count` independent calls on an
//! [`ImageGenerator`], decodes whatever images come back, and reports the
//! attempts that produced nothing. A failed attempt never aborts the batch and
//! is never retried.

use futures::future::join_all;

use crate::error::GenerationError;
use crate::params::{augment_prompt, GenerationConfig, GenerationRequest, SamplingConfig};
use crate::ports::{ContentRequest, ImageGenerator};
use crate::result::{AttemptFailure, DecodedImage, FailureKind, GenerationResult};

/// How the attempts of one batch are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Concurrency {
    /// One call at a time, in index order.
    #[default]
    Sequential,
    /// All calls in flight at once; results are still reported in index order.
    Parallel,
}

/// Settings that stay fixed across requests.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    /// Resolved model identifier.
    pub model: String,
    /// Sampling parameters for every call.
    pub sampling: SamplingConfig,
    /// Append the image-only instruction to prompts.
    pub augment_prompt: bool,
    /// Attempt scheduling.
    pub concurrency: Concurrency,
}

/// Adapts user requests onto an external image generator.
pub struct ImageRequestAdapter {
    generator: Box<dyn ImageGenerator>,
    settings: AdapterSettings,
}

impl ImageRequestAdapter {
    /// Create an adapter over `generator`.
    #[must_use]
    pub fn new(generator: Box<dyn ImageGenerator>, settings: AdapterSettings) -> Self {
        Self { generator, settings }
    }

    /// Generate `request.image_count` images.
    ///
    /// Per-attempt failures are collected into the result; only a missing
    /// credential or an invalid request is returned as an error, and both are
    /// detected before any external call.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` for a blank credential and
    /// `InvalidArgument` for a request that fails validation.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        credential: &str,
    ) -> Result<GenerationResult, GenerationError> {
        if credential.trim().is_empty() {
            return Err(GenerationError::MissingCredential);
        }
        request.validate()?;

        let call = self.content_request(request);
        tracing::debug!(
            model = %call.model,
            count = request.image_count,
            seed = ?request.seed,
            size = ?request.size,
            "starting generation batch"
        );

        let outcomes = match self.settings.concurrency {
            Concurrency::Sequential => {
                let mut outcomes = Vec::with_capacity(request.image_count as usize);
                for index in 1..=request.image_count {
                    outcomes.push(self.attempt(index, &call, credential).await);
                }
                outcomes
            }
            Concurrency::Parallel => {
                join_all(
                    (1..=request.image_count).map(|index| self.attempt(index, &call, credential)),
                )
                .await
            }
        };

        let mut result = GenerationResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(image) => result.images.push(image),
                Err(failure) => {
                    // Reported to the caller through the result.
                    tracing::debug!(
                        attempt = failure.index,
                        kind = %failure.kind,
                        "attempt produced no image: {}",
                        failure.message
                    );
                    result.failures.push(failure);
                }
            }
        }

        tracing::debug!(
            images = result.images.len(),
            failures = result.failures.len(),
            "generation batch finished"
        );
        Ok(result)
    }

    fn content_request(&self, request: &GenerationRequest) -> ContentRequest {
        let prompt = if self.settings.augment_prompt {
            augment_prompt(&request.prompt)
        } else {
            request.prompt.trim().to_string()
        };
        ContentRequest {
            model: self.settings.model.clone(),
            prompt,
            config: GenerationConfig {
                sampling: self.settings.sampling,
                seed: request.seed,
                size: request.size,
            },
        }
    }

    async fn attempt(
        &self,
        index: u32,
        call: &ContentRequest,
        credential: &str,
    ) -> Result<DecodedImage, AttemptFailure> {
        let response =
            self.generator.generate(call, credential).await.map_err(|e| AttemptFailure {
                index,
                kind: FailureKind::Transport,
                message: e.to_string(),
            })?;

        let inline = response.first_inline_image().ok_or_else(|| {
            let text: Vec<&str> =
                response.parts.iter().filter_map(|p| p.text.as_deref()).collect();
            let message = if text.is_empty() {
                "Response contained no image part".to_string()
            } else {
                format!("Response contained no image part; model replied: {}", text.join(" "))
            };
            AttemptFailure { index, kind: FailureKind::EmptyResponse, message }
        })?;

        DecodedImage::from_inline(index, inline).map_err(|e| AttemptFailure {
            index,
            kind: FailureKind::Decode,
            message: e.to_string(),
        })
    }
}
