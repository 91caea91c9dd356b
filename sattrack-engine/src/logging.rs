use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::Context;
use tokio::task;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Keeps the file writer flushing; drop it last.
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

/// Stdout plus a daily rotated file under `log_dir`, both honouring `RUST_LOG`.
///
/// Must be called from within a tokio runtime (the retention cleanup runs as
/// a task).
pub fn init_logging(
    log_dir: impl AsRef<Path>,
    prefix: &str,
    level: &str,
    retention_days: u64,
) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref().to_path_buf();

    let (level, level_valid) = if LEVELS.contains(&level) {
        (level, true)
    } else {
        ("info", false)
    };
    let default_level: LevelFilter = level.parse().unwrap_or(LevelFilter::INFO);

    let builder = EnvFilter::builder().with_default_directive(default_level.into());
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)
        .with_context(|| format!("Failed to create log appender in {}", log_dir.display()))?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if !level_valid {
        tracing::warn!("Invalid log level, defaulting to 'info'");
    }

    let max_age = Duration::from_secs(60 * 60 * 24 * retention_days);
    start_log_cleanup_task(log_dir, prefix.to_string(), max_age);

    Ok(LoggerGuard(guard))
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String, max_age: Duration) {
    task::spawn(async move {
        loop {
            match cleanup_old_logs(&log_dir, &prefix, max_age, SystemTime::now()) {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Removed {} old log files", removed),
                Err(e) => tracing::warn!("Failed to delete old log file: {}", e),
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

/// Delete `{prefix}*.log` files last modified more than `max_age` before `now`.
fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration, now: SystemTime) -> std::io::Result<usize> {
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            tracing::debug!("Old log file deleted: {}", file_name);
            removed += 1;
        }
    }
    Ok(removed)
}
