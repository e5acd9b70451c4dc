use clap::Parser;

/// scenecast: keeps an external presence in sync with the active scene.
#[derive(Parser, Debug)]
#[command(name = "scenecast", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Presence client id, overriding `[presence].client_id`.
    #[arg(long)]
    pub client_id: Option<u64>,

    /// Comma-separated scene names to activate in order.
    #[arg(long, value_delimiter = ',')]
    pub scenes: Vec<String>,

    /// Delay between scripted scene activations, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub scene_interval_ms: u64,

    /// Do not derive presence from scene changes.
    #[arg(long)]
    pub no_auto_sync: bool,

    /// Use the in-process loopback channel instead of the log sink.
    #[arg(long)]
    pub dry_run: bool,

    /// Reload contexts when the config file changes.
    #[arg(long)]
    pub watch: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
