//! CLI argument parsing with clap.

use clap::Parser;

/// Minecraft book preview renderer - debounced text-to-page rendering.
#[derive(Parser, Debug)]
#[command(name = "bookpress", version, about)]
pub struct Cli {
    /// Book text to render, formatting codes included.
    #[arg(conflicts_with = "text_file")]
    pub text: Option<String>,

    /// Path to a file containing the book text.
    #[arg(short = 'p', long, conflicts_with = "text")]
    pub text_file: Option<String>,

    /// Keep reading input lines from stdin, re-rendering after each quiet
    /// period.
    #[arg(long)]
    pub watch: bool,

    /// Output file path (auto-generated from the first line if not given).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format: png, jpeg, webp (default from the config file).
    #[arg(short, long)]
    pub format: Option<String>,

    /// Render service URL override.
    #[arg(long)]
    pub service_url: Option<String>,

    /// Quiet period in milliseconds before input is considered stable
    /// (default from the config file).
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the book text from either the positional argument or the file
    /// flag. Returns `None` when neither was given (valid only with
    /// `--watch`).
    ///
    /// # Errors
    ///
    /// Returns an error if the text file cannot be read.
    pub fn resolve_text(&self) -> Result<Option<String>, std::io::Error> {
        if let Some(ref text) = self.text {
            Ok(Some(text.clone()))
        } else if let Some(ref path) = self.text_file {
            std::fs::read_to_string(path).map(Some)
        } else {
            Ok(None)
        }
    }
}
