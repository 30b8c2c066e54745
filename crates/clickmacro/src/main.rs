//! clickmacro entry point.
//!
//! Wires the input listener, the hotkey dispatcher and the playback
//! controller together, then blocks until the operator quits.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ load config + parse CLI
//!  ├─ PlaybackController::new()   -- replay tasks run on this runtime
//!  ├─ controller event reporter   (Tokio task)
//!  ├─ InputSource::start()        (OS hook thread → mpsc channel)
//!  └─ InputDispatcher::pump()     (blocking thread until Quit / Ctrl-C)
//! ```

use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Context};
use clap::Parser;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clickmacro::application::dispatch_input::{Command, HotkeyMap, InputDispatcher, PumpExit};
use clickmacro::application::playback::{ControllerEvent, PlaybackController};
use clickmacro::application::replay_clicks::PointerInjector;
use clickmacro::infrastructure::input_capture::platform_input_source;
use clickmacro::infrastructure::pointer_injection::{mock::RecordingInjector, platform_injector};
use clickmacro::infrastructure::storage::config::{
    default_config_path, load_config_from, save_config_to, AppConfig,
};
use clickmacro_core::{LoopCount, SystemClock};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Record mouse clicks with their timing and replay them on demand.
#[derive(Debug, Parser)]
#[command(name = "clickmacro", version)]
struct Cli {
    /// Path to the TOML configuration file.
    ///
    /// Defaults to `config.toml` in the platform config directory. A missing
    /// default file means built-in defaults; a missing explicit file is an
    /// error.
    #[arg(long, env = "CLICKMACRO_CONFIG")]
    config: Option<PathBuf>,

    /// Number of times to play the recorded sequence (overrides the config).
    #[arg(long, value_parser = parse_loops)]
    loops: Option<LoopCount>,

    /// Log filter used when `RUST_LOG` is not set (overrides the config).
    #[arg(long)]
    log_level: Option<String>,

    /// Log replayed clicks instead of moving the real pointer.
    #[arg(long)]
    dry_run: bool,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    write_default_config: bool,
}

fn parse_loops(s: &str) -> Result<LoopCount, String> {
    let n: u32 = s.parse().map_err(|e| format!("{e}"))?;
    LoopCount::try_from(n).map_err(|e| e.to_string())
}

fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path().context("cannot locate the default config file"),
    }
}

fn load_config(path: &Path, explicit: bool) -> anyhow::Result<AppConfig> {
    if explicit && !path.exists() {
        bail!("config file {} does not exist", path.display());
    }
    load_config_from(path).with_context(|| format!("failed to load {}", path.display()))
}

// ── Presentation ──────────────────────────────────────────────────────────────

fn print_banner(hotkeys: &HotkeyMap, loops: LoopCount) {
    info!("clickmacro ready (replay loops: {loops})");
    for command in Command::ALL {
        if let Some(key) = hotkeys.key_for(command) {
            info!("  {key:<8} {}", command.describe());
        }
    }
}

/// Turns controller events into operator hints. Per-click progress is
/// already logged by the controller itself.
async fn report_events(mut events: mpsc::UnboundedReceiver<ControllerEvent>, hotkeys: HotkeyMap) {
    let key_name = |command| {
        hotkeys
            .key_for(command)
            .map_or_else(|| "the bound key".to_string(), |k| k.to_string())
    };
    while let Some(event) = events.recv().await {
        match event {
            ControllerEvent::RecordingStarted => info!(
                "click anywhere to record; press {} to stop",
                key_name(Command::StopRecording)
            ),
            ControllerEvent::RecordingStopped { recorded: 0 } => {
                warn!("no clicks were recorded")
            }
            ControllerEvent::RecordingStopped { .. } => info!(
                "press {} to replay",
                key_name(Command::StartReplay)
            ),
            ControllerEvent::ReplayStarted { .. } => info!(
                "press {} to abort",
                key_name(Command::RequestAbort)
            ),
            _ => {}
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = if cli.write_default_config {
        AppConfig::default()
    } else {
        load_config(&config_path, cli.config.is_some())?
    };

    // `RUST_LOG` wins, then `--log-level`, then `[logging] level`.
    let level = cli.log_level.as_deref().unwrap_or(config.logging.level.as_str());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    if cli.write_default_config {
        save_config_to(&config_path, &config)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        info!("wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let hotkeys = config
        .hotkey_map()
        .with_context(|| format!("invalid [hotkeys] in {}", config_path.display()))?;
    let loops = cli.loops.unwrap_or(config.replay.loop_count);

    let injector: Arc<dyn PointerInjector> = if cli.dry_run {
        info!("dry run: replayed clicks are logged, not performed");
        Arc::new(RecordingInjector::new())
    } else {
        platform_injector().context("no pointer injector for this platform (try --dry-run)")?
    };

    let (controller, events) =
        PlaybackController::new(injector, Arc::new(SystemClock), Handle::current());
    controller.set_loop_count(loops);
    let controller = Arc::new(controller);
    tokio::spawn(report_events(events, hotkeys.clone()));

    // ── Input listener ────────────────────────────────────────────────────────
    let source = platform_input_source().context("failed to create input listener")?;
    let input = source.start().context("failed to start input listener")?;

    print_banner(&hotkeys, loops);

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── Input pump ────────────────────────────────────────────────────────────
    let dispatcher = InputDispatcher::new(Arc::clone(&controller), hotkeys);
    let pump_running = Arc::clone(&running);
    let exit = tokio::task::spawn_blocking(move || dispatcher.pump(&input, &pump_running))
        .await
        .context("input pump terminated abnormally")?;

    running.store(false, Ordering::Relaxed);
    controller.shutdown().await;
    source.stop();

    if exit == PumpExit::ListenerDisconnected {
        bail!("input listener stopped unexpectedly");
    }
    info!("clickmacro stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
