mod cli;
mod driver;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scenecast_common::{ConfigError, EventBus};
use scenecast_config::{toml_loader, ScenecastConfig};
use scenecast_presence::{
    ContextRegistry, LogSink, LoopbackChannel, ManagerOptions, PresenceChannel, PresenceManager,
    TaskChannel,
};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::driver::Driver;

const EVENT_BUS_CAPACITY: usize = 256;

/// Load config once, or start the reloader when `--watch` is set.
fn load_config(
    args: &cli::Args,
) -> Result<(ScenecastConfig, Option<watch::Receiver<ScenecastConfig>>), ConfigError> {
    let path = match &args.config {
        Some(path) => PathBuf::from(path),
        None if args.watch => toml_loader::default_config_path()?,
        None => return Ok((scenecast_config::load_config()?, None)),
    };

    if args.watch {
        let (initial, rx) = scenecast_config::ConfigReloader::start(path);
        return Ok((initial, Some(rx)));
    }
    Ok((toml_loader::load_from_path(&path)?, None))
}

fn init_logging(directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
            ),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // Config first: it carries the default log level.
    let loaded = load_config(&args);
    let level = match &loaded {
        Ok((config, _)) => config.logging.level.as_directive(),
        Err(_) => "info",
    };
    init_logging(args.log_level.as_deref().unwrap_or(level));

    tracing::info!("scenecast v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {path}");
    }

    let outcome = match loaded {
        Ok((config, reload)) => run(&args, config, reload).await,
        // An explicitly named config must load; the platform default may fall back.
        Err(e) if args.config.is_some() => Err(e.into()),
        Err(e) => {
            tracing::warn!("Config load failed, using defaults: {e}");
            run(&args, ScenecastConfig::default(), None).await
        }
    };

    if let Err(e) = outcome {
        tracing::error!("scenecast stopped: {e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}

async fn run(
    args: &cli::Args,
    config: ScenecastConfig,
    reload: Option<watch::Receiver<ScenecastConfig>>,
) -> scenecast_common::Result<()> {
    let registry = ContextRegistry::from_config(&config.contexts);
    tracing::info!("Context registry loaded ({} contexts)", registry.len());

    let mut options = ManagerOptions::from(&config.presence);
    if let Some(client_id) = args.client_id {
        options.client_id = client_id;
    }
    if args.no_auto_sync {
        options.auto_context_sync = false;
    }

    let channel: Box<dyn PresenceChannel> = if args.dry_run {
        Box::new(LoopbackChannel::new())
    } else {
        Box::new(TaskChannel::new(LogSink::new()))
    };

    let manager = PresenceManager::start(channel, registry, options)?;
    tracing::info!("Presence manager {}", manager.state());

    let bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
    let events = bus.subscribe();

    let tick = Duration::from_millis(u64::from(config.presence.tick_interval_ms.max(1)));
    driver::spawn_ticker(Arc::clone(&bus), tick);
    driver::spawn_ctrl_c(Arc::clone(&bus));
    if !args.scenes.is_empty() {
        driver::spawn_scene_script(
            Arc::clone(&bus),
            args.scenes.clone(),
            Duration::from_millis(args.scene_interval_ms),
        );
    }

    tracing::info!("Entering event loop");
    let manager = Driver::new(manager, args.no_auto_sync)
        .run(events, reload)
        .await;
    if let Some(presence) = manager.current_presence() {
        tracing::info!("Last confirmed presence: {presence}");
    }
    Ok(())
}
