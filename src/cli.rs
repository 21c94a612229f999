//! CLI argument parsing with clap.

use clap::Parser;

/// Product shot generator - turn a product photo and a scene prompt into a marketing shot.
#[derive(Parser, Debug)]
#[command(name = "shotgen", version, about)]
pub struct Cli {
    /// Scene description for the product shot.
    pub prompt: Option<String>,

    /// Product photo to upload (.jpeg, .jpg, .png, .webp; up to 10 MiB).
    #[arg(short, long)]
    pub image: Option<String>,

    /// Aspect ratio: 1:1, 4:3, 16:9, 9:16 (defaults to the config value, then 1:1).
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Generation endpoint override.
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds.
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Read commands from stdin instead of running a single generation.
    #[arg(long, conflicts_with_all = ["prompt", "image"])]
    pub interactive: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
