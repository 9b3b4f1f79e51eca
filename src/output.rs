//! File naming and saving of decoded images.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageFormat;

use crate::error::GenerationError;
use crate::params::format_extension;
use crate::result::DecodedImage;

/// Generate an output filename from a prompt and format.
///
/// Sanitizes the first 50 characters of the prompt to kebab-case, appends a
/// unix timestamp and, for batches, the attempt index.
#[must_use]
pub fn auto_filename(prompt: &str, index: Option<u32>, format: ImageFormat) -> String {
    let sanitized = sanitize_for_filename(prompt, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let ext = format_extension(format);
    match index {
        Some(i) => format!("{sanitized}-{timestamp}-{i}.{ext}"),
        None => format!("{sanitized}-{timestamp}.{ext}"),
    }
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars().take(max_len * 2) {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Resolve where one image of a batch is saved.
///
/// `index` is set when the batch requested more than one image; an explicit
/// path then gets a `-N` suffix before its extension.
#[must_use]
pub fn resolve_output_path(
    explicit: Option<&str>,
    prompt: &str,
    index: Option<u32>,
    format: ImageFormat,
) -> PathBuf {
    let Some(p) = explicit else {
        return PathBuf::from(auto_filename(prompt, index, format));
    };
    let base = PathBuf::from(p);
    let Some(i) = index else {
        return base;
    };
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let ext = base
        .extension()
        .map_or_else(|| format_extension(format).to_string(), |e| e.to_string_lossy().into_owned());
    base.with_file_name(format!("{stem}-{i}.{ext}"))
}

/// Re-encode an image to `format` and write it to `output_path`.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn save_image(
    image: &DecodedImage,
    format: ImageFormat,
    output_path: &Path,
) -> Result<(), GenerationError> {
    let bytes = image.encode(format)?;
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, bytes)?;
    Ok(())
}
