//! Pixprompt - prompt-to-image CLI for Gemini.

mod adapter;
mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod model;
mod output;
mod params;
mod ports;
mod result;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::adapter::{AdapterSettings, Concurrency, ImageRequestAdapter};
use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::GenerationError;
use crate::model::{resolve_model, validate_model};
use crate::output::{resolve_output_path, save_image};
use crate::params::{parse_format, GenerationRequest, ImageSize};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "pixprompt=debug"
    } else {
        "warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode, GenerationError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(GenerationError::Config)?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    let prompt = cli.resolve_prompt()?;

    let model = resolve_model(cli.model.as_deref().unwrap_or(&config.defaults.model));
    validate_model(&model).map_err(GenerationError::InvalidArgument)?;

    let size = cli
        .size
        .as_deref()
        .or(config.defaults.size.as_deref())
        .map(str::parse::<ImageSize>)
        .transpose()
        .map_err(GenerationError::InvalidArgument)?;
    let format = parse_format(cli.format.as_deref().unwrap_or(&config.defaults.format))
        .map_err(GenerationError::InvalidArgument)?;

    let request = GenerationRequest::new(prompt.clone(), cli.count)
        .with_seed(cli.seed)
        .with_size(size);
    let credential = config.credential(cli.api_key.as_deref());

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("PIXPROMPT_REPLAY").ok();
    let is_recording = std::env::var("PIXPROMPT_REC").is_ok_and(|v| v == "true" || v == "1");
    let api_base = std::env::var("PIXPROMPT_API_BASE").ok();

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::debug!(cassette = %cassette_path, "replaying");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        tracing::debug!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(api_base.as_deref());
        (ctx, Some(session))
    } else {
        (ServiceContext::live(api_base.as_deref()), None)
    };

    let settings = AdapterSettings {
        model,
        sampling: config.sampling,
        augment_prompt: config.defaults.augment_prompt && !cli.raw_prompt,
        concurrency: if cli.parallel {
            Concurrency::Parallel
        } else {
            Concurrency::Sequential
        },
    };
    let adapter = ImageRequestAdapter::new(ctx.generator, settings);
    let outcome = adapter.generate(&request, &credential).await;
    drop(adapter);

    // Finish recording if active
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    let result = outcome?;

    for failure in &result.failures {
        eprintln!("Warning: {failure}");
    }

    if let Some(notice) = result.failure_notice() {
        eprintln!("Error: {notice}");
        return Ok(ExitCode::FAILURE);
    }

    let batch = request.image_count > 1;
    for image in &result.images {
        let index = batch.then_some(image.index);
        let output_path = resolve_output_path(cli.output.as_deref(), &prompt, index, format);
        tracing::debug!(
            index = image.index,
            source_format = ?image.format,
            mime = %image.mime_type,
            width = image.image.width(),
            height = image.image.height(),
            "saving image"
        );
        save_image(image, format, &output_path)?;
        eprintln!("Saved: {}", output_path.display());
    }

    Ok(ExitCode::SUCCESS)
}
