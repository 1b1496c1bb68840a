use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "code-splash", version, about = "Splash incoming code across the screen as short physical text effects")]
pub struct Config {
    /// TCP port for `POST /effect`.
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Skip the network listener entirely.
    #[arg(long, default_value_t = false)]
    pub no_listen: bool,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = SurfaceMode::Terminal)]
    pub surface: SurfaceMode,

    /// Headless surface width in points.
    #[arg(long, default_value_t = 1920.0)]
    pub width: f32,

    /// Headless surface height in points.
    #[arg(long, default_value_t = 1080.0)]
    pub height: f32,

    #[arg(long, default_value_t = 1.0)]
    pub max_opacity: f32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Force a style instead of letting the selector choose.
    #[arg(long)]
    pub style: Option<String>,

    /// Fire one effect with this text at startup.
    #[arg(long)]
    pub text: Option<String>,

    /// Exit once the startup text has finished animating.
    #[arg(long, default_value_t = false)]
    pub once: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    /// `key=value` tuning file; defaults to the XDG config location.
    #[arg(long)]
    pub tuning: Option<PathBuf>,

    /// Write logs here instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SurfaceMode {
    #[value(alias = "tty", alias = "term")]
    Terminal,
    #[value(alias = "none")]
    Headless,
}

impl Config {
    /// Target frame interval, clamped to 1..=240 fps.
    pub fn frame_interval_secs(&self) -> f32 {
        1.0 / self.fps.clamp(1, 240) as f32
    }
}
