//! Logging setup for the Consulta service.
//!
//! All crates log through `tracing` macros; this module installs the global
//! subscriber once at startup.

use consulta_config::LoggingConfig;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling log files.
const LOG_FILE_PREFIX: &str = "consulta.log";

/// Initialize the tracing subscriber at INFO.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
pub fn init_with_level(level: Level) {
    // Use try_init to handle the case where a global default subscriber has already been set
    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize logging from the `logging` config section.
///
/// When a directory is configured, logs are additionally written to a daily
/// rolling file there. The returned guard flushes that file writer on drop and
/// must be held for the lifetime of the process.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = parse_level(&config.level);

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(file_layer)
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (file output: {})",
            level,
            config.directory.as_deref().unwrap_or("disabled")
        );
    }

    guard
}

/// Parses a level name, falling back to INFO for unknown values.
pub fn parse_level(level: &str) -> Level {
    level.trim().parse::<Level>().unwrap_or(Level::INFO)
}

fn stdout_layer<S>() -> fmt::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
}

/// `RUST_LOG` directives plus `consulta=<level>` for all workspace crates.
fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("consulta={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}
