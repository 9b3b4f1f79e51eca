//! Shared helpers for binary-level tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use serde_json::{json, Value};

/// A `pixprompt` command isolated from the developer's environment.
pub fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pixprompt");
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("PIXPROMPT_REPLAY")
        .env_remove("PIXPROMPT_REC")
        .env_remove("PIXPROMPT_API_BASE")
        .env_remove("RUST_LOG")
        .env("PIXPROMPT_CONFIG", "/nonexistent/pixprompt/config.toml");
    cmd
}

/// A fresh, empty scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pixprompt_it_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Base64 of a small solid-color PNG.
pub fn png_b64(shade: u8) -> String {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([shade, 0, 255 - shade]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img).write_to(&mut buf, image::ImageFormat::Png).unwrap();
    base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
}

/// Recorded output of a call that returned an image.
pub fn ok_image(shade: u8) -> Value {
    json!({"Ok": {"parts": [
        {"text": "Here is your image."},
        {"inline_data": {"mime_type": "image/png", "data": png_b64(shade)}}
    ]}})
}

/// Recorded output of a call that returned text only.
pub fn ok_text_only(text: &str) -> Value {
    json!({"Ok": {"parts": [{"text": text}]}})
}

/// Recorded output of a failed call.
pub fn err(message: &str) -> Value {
    json!({"Err": message})
}

/// Write a cassette serving `outputs` in order and return its path.
pub fn write_cassette(dir: &Path, outputs: Vec<Value>) -> PathBuf {
    let interactions: Vec<Value> = outputs
        .into_iter()
        .enumerate()
        .map(|(seq, output)| {
            json!({
                "seq": seq,
                "port": "image_generator",
                "method": "generate",
                "input": {},
                "output": output,
            })
        })
        .collect();
    let cassette = json!({
        "name": "test",
        "recorded_at": "2026-01-01T00:00:00Z",
        "commit": "test",
        "interactions": interactions,
    });
    let path = dir.join("test.cassette.yaml");
    std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();
    path
}
