// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "bouquet-editor")]
#[command(about = "Headless 3D bouquet editor", long_about = None)]
pub struct Cli {
    /// JSON config file (falls back to $BOUQUET_CONFIG, then built-in defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the flower model paths are relative to
    #[arg(long = "models-dir", default_value = "models")]
    pub models_dir: PathBuf,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 720.0)]
    pub height: f32,

    /// Width of the sidebar left of the canvas
    #[arg(long = "sidebar-width", default_value_t = 0.0)]
    pub sidebar_width: f32,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Only print command results, no prompt or status lines
    #[arg(long, default_value = "false")]
    pub quiet: bool,
}
