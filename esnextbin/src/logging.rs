use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Name of the log file for a run started at `started`
pub fn log_filename(started: DateTime<Local>) -> String {
    format!("esnextbin-{}.log", started.format("%Y-%m-%d-%H-%M-%S"))
}

/// Initialize tracing with file-based logging
/// Logs are written to ~/.config/esnextbin/logs/esnextbin-YYYY-MM-DD-HH-MM-SS.log
///
/// The returned guard flushes pending lines when dropped; hold it until exit.
pub fn init_logging() -> Result<(PathBuf, WorkerGuard)> {
    let logs_dir = dirs::config_dir()
        .ok_or(anyhow::anyhow!("Could not find config directory"))?
        .join("esnextbin")
        .join("logs");
    std::fs::create_dir_all(&logs_dir)?;

    let log_filename = log_filename(Local::now());
    let log_path = logs_dir.join(&log_filename);

    let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // Default to INFO, overridable with RUST_LOG
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()?;

    Ok((log_path, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_carries_start_time() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(log_filename(started), "esnextbin-2024-03-09-07-05-01.log");
    }
}
