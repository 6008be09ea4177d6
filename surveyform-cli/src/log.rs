use std::fmt;

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, fmt as fmt_layer, prelude::*};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, ValueEnum)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors from surveyform
    Error,
    /// Warnings and errors from surveyform
    #[default]
    Warn,
    /// Info, warning and error messages from surveyform
    Info,
    /// Debug messages from surveyform, including dropped answers and malformed schemas
    Debug,
    /// Everything, from all dependencies
    Trace,
}

impl LogLevel {
    pub(crate) fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "surveyform=error,off",
            LogLevel::Warn => "surveyform=warn,off",
            LogLevel::Info => "surveyform=info,off",
            LogLevel::Debug => "surveyform=debug,off",
            LogLevel::Trace => "trace",
        }
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Logs go to stderr so stdout stays parseable. Without `--log-level`,
/// `RUST_LOG` decides.
pub(crate) fn init(level: Option<LogLevel>) {
    let builder = EnvFilter::builder();
    let filter = match level {
        Some(level) => builder.parse_lossy(level.as_filter_str()),
        None => builder
            .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
            .from_env_lossy(),
    };
    tracing_subscriber::registry()
        .with(fmt_layer::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
