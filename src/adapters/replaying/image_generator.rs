//! Replaying adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result, Replayed};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::GenerationError;
use crate::ports::image_generator::{
    ContentRequest, ContentResponse, GenerateFuture, ImageGenerator,
};

/// Serves recorded generation results from a cassette.
pub struct ReplayingImageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageGenerator for ReplayingImageGenerator {
    fn generate(&self, _request: &ContentRequest, _credential: &str) -> GenerateFuture<'_> {
        let output = next_output(&self.replayer, "image_generator", "generate");
        Box::pin(async move {
            let output = output.map_err(GenerationError::Cassette)?;
            match replay_result::<ContentResponse>(output) {
                Ok(Replayed::Ok(response)) => Ok(response),
                // Recorded failures replay as transport errors.
                Ok(Replayed::Err(message)) => Err(GenerationError::Api { status: 0, message }),
                Err(e) => Err(GenerationError::Cassette(format!("Malformed recorded output: {e}"))),
            }
        })
    }
}
