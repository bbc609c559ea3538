use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;

/// Filter used when `RUST_LOG` is not set: our crate at debug, decoders quiet
pub fn default_filter() -> EnvFilter {
    EnvFilter::new("debug")
        .add_directive("png=warn".parse().expect("static directive"))
        .add_directive("image=warn".parse().expect("static directive"))
}

/// Install a console layer (stderr, keeping stdout for run summaries) and a
/// log file layer, both bracketed.
///
/// The log file is `patch_dataset_builder_<timestamp>.log` inside `log_dir`,
/// created if needed. Returns the log file path.
pub fn setup_logging(log_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("patch_dataset_builder_{}.log", timestamp));

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)?;

    let file_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    let console_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter()))
        .with(file_layer)
        .with(console_layer)
        .init();

    info!("Log file created at: {:?}", log_path);
    Ok(log_path)
}
