//! Recording adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use super::{complete_call, reserve_call};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_generator::{ContentRequest, GenerateFuture, ImageGenerator};

/// Records generation calls while delegating to an inner implementation.
///
/// Only the request is recorded; the credential never reaches the cassette.
/// The cassette slot is taken when `generate` is called, not when the call
/// completes, so parallel attempts replay against the attempt that issued them.
pub struct RecordingImageGenerator {
    inner: Box<dyn ImageGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Box<dyn ImageGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageGenerator for RecordingImageGenerator {
    fn generate(&self, request: &ContentRequest, credential: &str) -> GenerateFuture<'_> {
        let request = request.clone();
        let credential = credential.to_string();
        let recorder = Arc::clone(&self.recorder);
        let slot = reserve_call(&recorder, "image_generator", "generate", &request);

        Box::pin(async move {
            let result = self.inner.generate(&request, &credential).await;
            if let Some(seq) = slot {
                complete_call(&recorder, seq, &result);
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use base64::Engine;

    use super::*;
    use crate::adapter::{AdapterSettings, Concurrency, ImageRequestAdapter};
    use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
    use crate::cassette::config::load_cassette;
    use crate::error::GenerationError;
    use crate::params::{GenerationConfig, GenerationRequest, SamplingConfig};
    use crate::ports::image_generator::{ContentResponse, InlineData, ResponsePart};
    use crate::result::GenerationResult;

    struct Fixed(bool);

    impl ImageGenerator for Fixed {
        fn generate(&self, _request: &ContentRequest, _credential: &str) -> GenerateFuture<'_> {
            let ok = self.0;
            Box::pin(async move {
                if ok {
                    Ok(ContentResponse {
                        parts: vec![ResponsePart {
                            text: None,
                            inline_data: Some(InlineData {
                                mime_type: "image/png".into(),
                                data: "AAAA".into(),
                            }),
                        }],
                    })
                } else {
                    Err(GenerationError::Api {
                        status: 401,
                        message: "bad key".into(),
                    })
                }
            })
        }
    }

    fn request() -> ContentRequest {
        ContentRequest {
            model: "gemini-2.5-flash-image".into(),
            prompt: "a cat".into(),
            config: GenerationConfig {
                sampling: SamplingConfig::default(),
                seed: None,
                size: None,
            },
        }
    }

    #[tokio::test]
    async fn records_success_and_failure_without_credential() {
        let dir = std::env::temp_dir().join("pixprompt_recording_adapter_test");
        let path = dir.join("rec.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "rec", "abc")));

        let ok = RecordingImageGenerator::new(Box::new(Fixed(true)), Arc::clone(&recorder));
        let failing = RecordingImageGenerator::new(Box::new(Fixed(false)), Arc::clone(&recorder));
        assert!(ok.generate(&request(), "super-secret-key").await.is_ok());
        assert!(failing.generate(&request(), "super-secret-key").await.is_err());
        drop(ok);
        drop(failing);

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        let path = recorder.finish().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("a cat"));
        assert!(content.contains("AAAA"));
        assert!(content.contains("bad key"));
        assert!(!content.contains("super-secret-key"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    /// Attempt `n` of `total` finishes after every later attempt.
    struct Staggered {
        total: usize,
        calls: AtomicUsize,
    }

    impl ImageGenerator for Staggered {
        fn generate(&self, _request: &ContentRequest, _credential: &str) -> GenerateFuture<'_> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let yields = (self.total + 1 - n) * 3;
            Box::pin(async move {
                for _ in 0..yields {
                    tokio::task::yield_now().await;
                }
                #[allow(clippy::cast_possible_truncation)]
                let shade = (n * 10) as u8;
                Ok(shaded_png(shade))
            })
        }
    }

    fn shaded_png(shade: u8) -> ContentResponse {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([shade, shade, shade]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img).write_to(&mut buf, image::ImageFormat::Png).unwrap();
        ContentResponse {
            parts: vec![ResponsePart {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: "image/png".into(),
                    data: base64::engine::general_purpose::STANDARD.encode(buf.into_inner()),
                }),
            }],
        }
    }

    fn shades(result: &GenerationResult) -> Vec<(u32, u8)> {
        result
            .images
            .iter()
            .map(|i| (i.index, i.image.to_rgb8().get_pixel(0, 0).0[0]))
            .collect()
    }

    fn parallel_adapter(generator: Box<dyn ImageGenerator>) -> ImageRequestAdapter {
        let settings = AdapterSettings {
            model: "gemini-2.5-flash-image".into(),
            sampling: SamplingConfig::default(),
            augment_prompt: false,
            concurrency: Concurrency::Parallel,
        };
        ImageRequestAdapter::new(generator, settings)
    }

    #[tokio::test]
    async fn parallel_recording_replays_to_the_same_attempts() {
        let dir = std::env::temp_dir().join("pixprompt_recording_parallel_test");
        let path = dir.join("parallel.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "parallel", "abc")));
        let request = GenerationRequest::new("three shades", 3);

        let staggered = Staggered { total: 3, calls: AtomicUsize::new(0) };
        let recording = RecordingImageGenerator::new(Box::new(staggered), Arc::clone(&recorder));
        let adapter = parallel_adapter(Box::new(recording));
        let live = adapter.generate(&request, "key").await.unwrap();
        drop(adapter);
        assert_eq!(shades(&live), vec![(1, 10), (2, 20), (3, 30)]);

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        let path = recorder.finish().unwrap();

        let replayer = Arc::new(Mutex::new(load_cassette(&path).unwrap()));
        let adapter = parallel_adapter(Box::new(ReplayingImageGenerator::new(replayer)));
        let replayed = adapter.generate(&request, "key").await.unwrap();
        assert_eq!(shades(&replayed), shades(&live));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
