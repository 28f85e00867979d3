//! keyhook-tap: prints every key-down and key-up in the system.
//!
//! # Usage
//!
//! ```text
//! keyhook-tap [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Config file [default: platform config dir]
//!   --format <FORMAT>      Output format: text | json
//!   --duration <SECS>      Stop after this many seconds
//!   --log-level <LEVEL>    tracing level when RUST_LOG is unset
//!   --no-key-names         Do not append VK_* names to text output
//! ```
//!
//! CLI flags override values from the config file, which override the
//! built-in defaults.
//!
//! # Architecture overview
//!
//! ```text
//! capture thread ── listener ──▶ mpsc channel ──▶ printer (this task) ──▶ stdout
//! ```
//!
//! The listener only copies the event into an unbounded channel so the
//! system-wide hook chain is never held up by terminal I/O.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use keyhook::infrastructure::storage::config::{self, OutputFormat, TapSettings};
use keyhook::output::render_event;
use keyhook::KeyEvent;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Global keyboard tap.
///
/// Installs a low-level keyboard hook and prints every key event until Ctrl-C
/// or until `--duration` elapses.
#[derive(Debug, Parser)]
#[command(
    name = "keyhook-tap",
    about = "Print every key-down and key-up observed by a global keyboard hook",
    version
)]
struct Cli {
    /// Path of the TOML config file.  Defaults to the platform config directory.
    #[arg(long, env = "KEYHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, env = "KEYHOOK_FORMAT")]
    format: Option<OutputFormat>,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long, env = "KEYHOOK_DURATION")]
    duration: Option<u64>,

    /// Log level used when `RUST_LOG` is unset, e.g. `debug`.
    #[arg(long)]
    log_level: Option<String>,

    /// Do not append `VK_*` key names to text output.
    #[arg(long)]
    no_key_names: bool,
}

impl Cli {
    /// Loads the config file named by `--config` (or the default one) and
    /// applies the CLI overrides on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    fn into_settings(self) -> anyhow::Result<TapSettings> {
        let file = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match config::load_config() {
                Ok(file) => file,
                Err(config::ConfigError::NoPlatformConfigDir) => config::TapConfig::default(),
                Err(e) => return Err(e).context("failed to load config from the default location"),
            },
        };
        Ok(self.apply(file.tap))
    }

    fn apply(self, mut settings: TapSettings) -> TapSettings {
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(secs) = self.duration {
            settings.duration_secs = Some(secs);
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        if self.no_key_names {
            settings.show_key_names = false;
        }
        settings
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Cli::parse().into_settings()?;

    // `RUST_LOG` wins; otherwise the configured level, otherwise `info`.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&settings.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!(?settings, "effective settings");
    run(settings).await
}

#[cfg(target_os = "windows")]
async fn run(settings: TapSettings) -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::time::Duration;

    use keyhook::KeyHook;
    use tracing::{error, info};

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<KeyEvent>();
    let hook = Arc::new(KeyHook::new());
    hook.add_listener(move |event| {
        // The receiver only goes away during shutdown.
        let _ = tx.send(*event);
    });
    hook.start().context("failed to start keyboard hook")?;
    info!("keyhook-tap ready.  Press Ctrl-C to exit.");

    let duration = settings.duration_secs;
    let shutdown = async move {
        let deadline = async {
            match duration {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("received Ctrl-C, shutting down"),
                Err(e) => error!("failed to listen for Ctrl-C: {e}"),
            },
            () = deadline => info!("duration elapsed, shutting down"),
        }
    };

    let printed = pump_events(
        rx,
        std::io::stdout(),
        settings.format,
        settings.show_key_names,
        shutdown,
    )
    .await
    .context("failed to write key event")?;

    hook.stop();
    let joiner = Arc::clone(&hook);
    tokio::task::spawn_blocking(move || joiner.join())
        .await
        .context("join task failed")?
        .context("capture thread failed")?;

    info!(printed, "keyhook-tap stopped");
    Ok(())
}

#[cfg(not(target_os = "windows"))]
async fn run(settings: TapSettings) -> anyhow::Result<()> {
    debug!(?settings, "ignoring settings on unsupported platform");
    anyhow::bail!("keyhook-tap requires Windows: low-level keyboard hooks are a Win32 facility")
}

/// Prints events from `rx` to `out` until `shutdown` completes or the channel
/// closes.  Returns the number of events printed.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
async fn pump_events<W: Write>(
    mut rx: UnboundedReceiver<KeyEvent>,
    mut out: W,
    format: OutputFormat,
    show_key_names: bool,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<usize> {
    tokio::pin!(shutdown);
    let mut printed = 0;
    loop {
        tokio::select! {
            maybe_event = rx.recv() => match maybe_event {
                Some(event) => {
                    writeln!(out, "{}", render_event(&event, format, show_key_names))?;
                    out.flush()?;
                    printed += 1;
                }
                None => break,
            },
            () = &mut shutdown => break,
        }
    }
    Ok(printed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
