//! Subscriber setup for the crate's `tracing` output
//!
//! Every event the resolver, generator and container emit uses the
//! `dependency_compiler` target. This module installs a `tracing-subscriber`
//! registry for binaries and build scripts that do not set one up themselves.
//!
//! # Features
//!
//! - `logging` - emit events (default)
//! - `logging-json` - JSON subscriber output
//! - `logging-pretty` - multi-line human readable subscriber output
//!
//! # Example
//!
//! ```rust,ignore
//! use dependency_compiler::logging;
//!
//! // JSON if logging-json is enabled, pretty otherwise
//! logging::init();
//!
//! // Only this crate's events, at TRACE, honouring RUST_LOG when set
//! logging::builder()
//!     .trace()
//!     .compiler_only()
//!     .from_env()
//!     .compact()
//!     .init();
//! ```

#[cfg(feature = "logging")]
use tracing::Level;

/// Target of every event emitted by this crate
pub const TARGET: &str = "dependency_compiler";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Multi-line output for terminals
    Pretty,
    /// Single-line output
    Compact,
}

/// Builder for the subscriber
#[cfg(feature = "logging")]
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    targets: Vec<&'static str>,
    from_env: bool,
    with_file: bool,
    with_line_number: bool,
    with_thread_names: bool,
}

#[cfg(feature = "logging")]
impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            targets: Vec::new(),
            from_env: false,
            with_file: false,
            with_line_number: false,
            with_thread_names: false,
        }
    }
}

#[cfg(feature = "logging")]
impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum level of events shown
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Show plan construction step by step, including memo hits
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    /// Only failures and deprecation notices
    pub fn warn(self) -> Self {
        self.with_level(Level::WARN)
    }

    /// Restrict output to `target`. Can be called repeatedly.
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
        self
    }

    /// Restrict output to this crate's events
    pub fn compiler_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    /// Prefer `RUST_LOG` over the configured filter when it is set
    pub fn from_env(mut self) -> Self {
        self.from_env = true;
        self
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Filter directives for the configured level and targets
    pub fn directives(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        if self.targets.is_empty() {
            level
        } else {
            self.targets
                .iter()
                .map(|target| format!("{target}={level}"))
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    /// Install the subscriber globally.
    ///
    /// Returns `false` when another subscriber was installed first.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) -> bool {
        use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

        let filter = if self.from_env {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
        } else {
            EnvFilter::new(self.directives())
        };

        let base = fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_thread_names(self.with_thread_names)
            .with_target(true);

        let layer: Box<dyn Layer<Registry> + Send + Sync> = match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => base.json().boxed(),
            // Without the json feature JSON output degrades to the default format
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => base.boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Compact => base.compact().boxed(),
        };

        tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_ok()
    }

    /// No subscriber is available without `logging-json` or `logging-pretty`
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) -> bool {
        false
    }
}

/// Create a new logging builder
#[cfg(feature = "logging")]
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Install a DEBUG subscriber: JSON with `logging-json`, pretty otherwise
#[cfg(feature = "logging")]
pub fn init() -> bool {
    if cfg!(feature = "logging-json") {
        init_json()
    } else {
        init_pretty()
    }
}

/// Install a DEBUG subscriber with JSON output
///
/// ```json
/// {"timestamp":"2026-01-01T00:00:00.000Z","level":"DEBUG","fields":{"message":"Resolved constructor parameters","class":"app::Mailer","parameters":2},"target":"dependency_compiler"}
/// ```
#[cfg(feature = "logging")]
pub fn init_json() -> bool {
    builder().json().debug().init()
}

/// Install a DEBUG subscriber with pretty output
#[cfg(feature = "logging")]
pub fn init_pretty() -> bool {
    builder().pretty().debug().init()
}

/// Install a subscriber showing only this crate's events
#[cfg(feature = "logging")]
pub fn init_compiler_only() -> bool {
    builder().compiler_only().debug().init()
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggingBuilder::default();
        assert_eq!(builder.level, Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Json);
        assert_eq!(builder.directives(), "debug");
    }

    #[test]
    fn test_target_directives() {
        let builder = LoggingBuilder::new()
            .trace()
            .compact()
            .compiler_only()
            .with_target_filter("my_app")
            .compiler_only();

        assert_eq!(builder.format, LogFormat::Compact);
        assert_eq!(builder.directives(), "dependency_compiler=trace,my_app=trace");
    }
}
