use anyhow::Result;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize structured logging.
///
/// Console output always goes to stderr so rendered results on stdout stay
/// clean. With `log_file` set, a daily-rolling file layer is added; it writes
/// JSON when `json` is true. The returned guard must be held until exit or
/// buffered file lines are lost.
pub fn init_logging(log_level: Option<&str>, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))
        .map_err(|e| anyhow::anyhow!("Failed to create log filter: {}", e))?;

    let registry = Registry::default().with(env_filter);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true);

    let guard = if let Some(log_path) = log_file {
        let directory = log_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        let file_name = log_path.file_name().and_then(|n| n.to_str()).unwrap_or("msg-intel.log");
        let (writer, guard) = non_blocking(rolling::daily(directory, file_name));

        let file_layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
        if json {
            registry.with(console_layer).with(file_layer.json()).try_init()?;
        } else {
            registry.with(console_layer).with(file_layer).try_init()?;
        }
        Some(guard)
    } else {
        registry.with(console_layer).try_init()?;
        None
    };

    info!("Logging system initialized");
    Ok(guard)
}

/// Logs how long an operation took
pub struct OperationTimer {
    operation: String,
    start: std::time::Instant,
}

impl OperationTimer {
    /// Start timing `operation`
    #[must_use]
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: std::time::Instant::now(),
        }
    }

    /// Elapsed time so far
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Log the elapsed time and return it in milliseconds
    pub fn finish(self) -> u128 {
        let duration = self.start.elapsed().as_millis();
        tracing::info!(operation = self.operation, duration_ms = duration, "Operation completed");
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_reports_elapsed() {
        let timer = OperationTimer::new("unit");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed().as_millis() >= 2);
        assert!(timer.finish() >= 2);
    }
}
