//! Implementations of the `ImageGenerator` port.
//!
//! - `live/` — Gemini over HTTP
//! - `recording/` — Wraps a live generator and writes a cassette
//! - `replaying/` — Serves generator outputs from a cassette

pub mod live;
pub mod recording;
pub mod replaying;
