//! Logging setup.
//!
//! All output goes through `tracing`. `log` macros used across the crate are
//! bridged with `tracing-log`, so both end up in the same daily-rolling JSON
//! file under `<data_dir>/logs`. Rotated files from earlier days are
//! gzip-compressed on a background thread.

use std::fs;
use std::io;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "onehand.log";

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn prepare_log_dir(log_dir: &Path) {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }
}

/// Initialize file logging for the terminal UI.
///
/// Sets up a daily-rolling JSON file logger in `log_dir` and the
/// `log` -> `tracing` bridge. Nothing goes to stdout; ratatui owns the
/// terminal. Keep the returned guard alive until shutdown so buffered lines
/// are flushed.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    prepare_log_dir(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter());

    tracing_subscriber::registry().with(file_layer).init();

    bridge_log_crate();
    spawn_compression(log_dir);

    guard
}

fn bridge_log_crate() {
    // The subscriber may already have installed the bridge.
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("LogTracer not installed: {}", e);
    }
}

fn spawn_compression(log_dir: &Path) {
    let log_dir = log_dir.to_path_buf();
    std::thread::spawn(move || compress_old_logs(&log_dir));
}

/// Rotated files look like `onehand.log.YYYY-MM-DD`; today's stays open.
fn should_compress(name: &str, today_suffix: &str) -> bool {
    name.starts_with(LOG_FILE_PREFIX)
        && name.len() > LOG_FILE_PREFIX.len()
        && !name.ends_with(today_suffix)
        && !name.ends_with(".gz")
}

/// `tracing_appender` dates rotated files in UTC.
fn active_suffix() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn compress_old_logs(log_dir: &Path) {
    let today_suffix = active_suffix();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !should_compress(name, &today_suffix) {
            continue;
        }
        match compress_file(&path) {
            Ok(()) => log::info!("Compressed old log: {:?}", path),
            Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
        }
    }
}

fn compress_file(path: &Path) -> io::Result<()> {
    let file = fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);

    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No parent directory"))?;
    let gz_path = parent.join(gz_name);

    if gz_path.exists() {
        return Ok(());
    }

    let output = fs::File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(())
}
