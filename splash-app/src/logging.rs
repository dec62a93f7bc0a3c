use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "splash=info,warn";

/// Directory holding `splash.log`
pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("splash")
}

/// Initialize tracing, writing to a log file since the terminal belongs to the UI.
///
/// `SPLASH_LOG` (or `RUST_LOG`) overrides the default filter.
pub fn init_logging() -> Result<PathBuf> {
    let filter = EnvFilter::try_from_env("SPLASH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let dir = log_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join("splash.log");
    let file = File::create(&path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    Ok(path)
}
