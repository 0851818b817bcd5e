//! Tracing subscriber setup.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Verbosity accepted by `--log.level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
}

impl LogLevel {
    /// `"debug"` selects debug output; anything else means info.
    pub fn parse(value: &str) -> Self {
        if value == "debug" {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
        }
    }
}

/// Build the filter for `level`. `RUST_LOG` directives, when present,
/// take precedence.
pub fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .from_env_lossy()
}

/// Install the global fmt subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .try_init();
}
