use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter, Layer};
use tz_core::config::LoggingConfig;

static INIT: Once = Once::new();

/// Installs the global subscriber: stdout (plain or JSON) plus an optional
/// file that receives `ERROR` events only. Later calls are no-ops.
///
/// Keep the returned guard alive for the life of the process so buffered
/// file writes are flushed.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let mut guard = None;

    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

        let stdout = if config.json {
            fmt::layer().json().with_target(true).boxed()
        } else {
            fmt::layer().with_ansi(true).with_target(true).boxed()
        };

        let error_file = config.error_log.as_ref().map(|path| {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(std::path::Path::new("."));
            let file = path.file_name().map(|f| f.to_os_string()).unwrap_or_else(|| "error.log".into());
            let (writer, file_guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));
            guard = Some(file_guard);
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(LevelFilter::ERROR)
        });

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout)
            .with(error_file);

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to set global default subscriber: {e}");
        }
    });

    guard
}
