//! Logging setup shared by the binaries.

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber
///
/// `RUST_LOG` directives are honored on top of the configured level. When
/// `log_dir` is set, output is also written to a daily-rolling file named
/// after `file_prefix`.
///
/// # Returns
///
/// * `Option<WorkerGuard>` - Flush guard for the file writer; keep it alive
///   until the process exits
pub fn init(config: &LoggingConfig, file_prefix: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(default_level(&config.level).into());

    let (file_layer, guard) = match config.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn default_level(level: &str) -> Level {
    level.parse().unwrap_or(Level::INFO)
}
