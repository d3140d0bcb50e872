// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "virtual-office")]
#[command(about = "Interactive 3D virtual office", long_about = None)]
pub struct Cli {
    /// JSON settings file (viewpoints, timings, cities)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON file with tasks, portfolio and dashboard records
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Viewpoint to start at, overriding the config
    #[arg(long)]
    pub view: Option<String>,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Preview resolution as a fraction of the window (0.05..=1)
    #[arg(long = "preview-scale")]
    pub preview_scale: Option<f32>,

    /// Disable UI elements and console output
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Read voice utterances from stdin, one per line
    #[arg(long = "console-voice", default_value = "false")]
    pub console_voice: bool,

    /// Run this many frames without a window, then exit
    #[arg(long = "headless-frames")]
    pub headless_frames: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["virtual-office"]);
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert!(!cli.no_ui);
        assert!(cli.headless_frames.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "virtual-office",
            "--view",
            "globe",
            "--preview-scale",
            "0.5",
            "--headless-frames",
            "3",
            "--console-voice",
        ]);
        assert_eq!(cli.view.as_deref(), Some("globe"));
        assert_eq!(cli.preview_scale, Some(0.5));
        assert_eq!(cli.headless_frames, Some(3));
        assert!(cli.console_voice);
    }
}
