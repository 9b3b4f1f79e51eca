//! Model name resolution and validation.

/// Short name aliases for Gemini image-capable models.
const ALIASES: &[(&str, &str)] = &[
    ("flash-exp", "gemini-2.0-flash-exp-image-generation"),
    ("flash-image", "gemini-2.5-flash-image"),
    ("nano-banana", "gemini-2.5-flash-image"),
    ("nano-banana-pro", "gemini-3-pro-image-preview"),
];

/// Model used when neither the CLI nor the config file names one.
pub const DEFAULT_MODEL: &str = "flash-exp";

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    ALIASES
        .iter()
        .find(|&&(alias, _)| alias == name)
        .map_or_else(|| name.to_string(), |&(_, full)| full.to_string())
}

/// Check that a resolved model identifier targets the Gemini API.
///
/// # Errors
///
/// Returns an error if the model name is not a `gemini-*` identifier.
pub fn validate_model(model: &str) -> Result<(), String> {
    if model.starts_with("gemini") {
        Ok(())
    } else {
        Err(format!("Unknown model '{model}'. Expected an alias or a 'gemini-*' identifier."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_flash_exp() {
        assert_eq!(resolve_model("flash-exp"), "gemini-2.0-flash-exp-image-generation");
    }

    #[test]
    fn resolve_image_aliases() {
        assert_eq!(resolve_model("flash-image"), "gemini-2.5-flash-image");
        assert_eq!(resolve_model("nano-banana"), "gemini-2.5-flash-image");
        assert_eq!(resolve_model("nano-banana-pro"), "gemini-3-pro-image-preview");
    }

    #[test]
    fn resolve_exact_name_passthrough() {
        assert_eq!(resolve_model("gemini-2.5-flash-image"), "gemini-2.5-flash-image");
    }

    #[test]
    fn default_model_resolves_to_gemini() {
        assert!(validate_model(&resolve_model(DEFAULT_MODEL)).is_ok());
    }

    #[test]
    fn non_gemini_model_rejected() {
        assert!(validate_model("gpt-image-1").is_err());
        assert!(validate_model("dall-e-3").is_err());
    }
}
