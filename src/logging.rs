//! Structured logging setup.
//!
//! Everything logs through `tracing`. [`init_logging_with_config`] installs a
//! registry with:
//! - an `EnvFilter` (`RUST_LOG` wins over `DOGS_LOG_LEVEL`)
//! - a sampling layer that can restrict output to warnings and errors
//! - a JSON or pretty `fmt` layer, optionally behind a non-blocking writer

use anyhow::{Context, Result};
use std::env;
use tracing::{Level, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// JSON for production, pretty-print for development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Which events reach the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    All,
    /// Only WARN and ERROR.
    ErrorOnly,
}

impl SamplingMode {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error-only" | "error_only" => SamplingMode::ErrorOnly,
            _ => SamplingMode::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    pub sampling_mode: SamplingMode,
    /// Write through a background thread instead of blocking on stdout.
    pub async_logging: bool,
    /// Extra comma-separated filter directives, e.g. `dogs_api::store=debug`.
    pub target_filter: Option<String>,
    /// Include file:line in each event.
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            sampling_mode: SamplingMode::All,
            async_logging: true,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Read `DOGS_LOG_*` variables, falling back to [`LogConfig::default`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("DOGS_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("DOGS_LOG_FORMAT").map_or(defaults.format, |s| LogFormat::parse(&s)),
            sampling_mode: lookup("DOGS_LOG_MODE")
                .map_or(defaults.sampling_mode, |s| SamplingMode::parse(&s)),
            async_logging: lookup("DOGS_LOG_ASYNC")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            target_filter: lookup("DOGS_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            include_location: lookup("DOGS_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// Verbose, synchronous, human-readable output for local runs and tests.
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            sampling_mode: SamplingMode::All,
            async_logging: false,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Drops events below WARN in [`SamplingMode::ErrorOnly`].
pub struct SamplingLayer {
    mode: SamplingMode,
}

impl SamplingLayer {
    pub fn new(mode: SamplingMode) -> Self {
        Self { mode }
    }

    fn should_sample(&self, metadata: &Metadata<'_>) -> bool {
        match self.mode {
            SamplingMode::All => true,
            SamplingMode::ErrorOnly => {
                metadata.is_span() || matches!(*metadata.level(), Level::WARN | Level::ERROR)
            }
        }
    }
}

impl<S> Layer<S> for SamplingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: LayerContext<'_, S>) -> bool {
        self.should_sample(metadata)
    }
}

/// Keeps the background writer alive; flushes pending events when dropped.
#[must_use = "dropping the guard stops asynchronous log output"]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

/// Build the env filter for `config`.
///
/// `may_minihttp` is capped at WARN: its per-connection chatter drowns
/// request logs.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    filter = filter.add_directive(
        "may_minihttp=warn"
            .parse()
            .context("invalid built-in log directive")?,
    );
    if let Some(targets) = &config.target_filter {
        for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            filter = filter.add_directive(
                directive
                    .parse()
                    .with_context(|| format!("invalid log filter directive '{directive}'"))?,
            );
        }
    }
    Ok(filter)
}

/// Install the global subscriber.
///
/// # Errors
///
/// An invalid filter directive, or a subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<LoggingGuard> {
    let (writer, worker) = if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(config)?)
        .with(SamplingLayer::new(config.sampling_mode))
        .with(fmt_layer)
        .try_init()
        .context("failed to initialize logging")?;

    Ok(LoggingGuard { _worker: worker })
}
