//! CLI argument parsing with clap.

use clap::Parser;

/// Generate images from a text prompt with Gemini.
#[derive(Parser, Debug)]
#[command(name = "pixprompt", version, about)]
pub struct Cli {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Model name or short alias (default from config, else flash-exp).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Number of images to generate (1-5).
    #[arg(
        short = 'n',
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=5)
    )]
    pub count: u32,

    /// Deterministic seed (0-10000).
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=10_000))]
    pub seed: Option<u64>,

    /// Image size: 1K, 2K, 4K.
    #[arg(short, long)]
    pub size: Option<String>,

    /// Output format: png, jpeg, webp (default from config, else png).
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output file path (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Gemini API key (falls back to `GEMINI_API_KEY`, then the config file).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Send the prompt exactly as written, without the image-only instruction.
    #[arg(long)]
    pub raw_prompt: bool,

    /// Issue all requests at once instead of one after another.
    #[arg(long)]
    pub parallel: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the prompt from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if neither prompt nor prompt-file is provided,
    /// or if the file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(text.clone())
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path)
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a prompt string or use -p/--prompt-file",
            ))
        }
    }
}
