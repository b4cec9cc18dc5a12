//! Logging setup for the CLI.
//!
//! Human logs go to stderr by default; `--json-output` or
//! `KOLGATE_LOG_FORMAT=json` switches to one JSON event per line, and
//! `KOLGATE_LOG_FILE` appends to a file instead. `RUST_LOG` overrides the
//! computed filter entirely.

use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LOG_LEVEL_ENV: &str = "KOLGATE_LOG";
const LOG_FORMAT_ENV: &str = "KOLGATE_LOG_FORMAT";
const LOG_FILE_ENV: &str = "KOLGATE_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable logs.
    #[default]
    Human,
    /// JSON logs (one event per line).
    Json,
    /// Compact logs (single line, terse).
    Compact,
}

impl LogFormat {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

impl LogLevel {
    /// Parse from CLI argument, env var or config value.
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "verbose" | "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "critical" | "crit" => Some(Self::Error),
            _ => None,
        }
    }

    /// Convert to tracing filter string.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Convert to tracing level.
    #[must_use]
    pub const fn as_tracing_level(self) -> Level {
        match self {
            Self::Trace => Level::TRACE,
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse log level from `KOLGATE_LOG`.
#[must_use]
pub fn parse_log_level_from_env() -> Option<LogLevel> {
    non_empty_env(LOG_LEVEL_ENV).and_then(|v| LogLevel::from_arg(&v))
}

/// Parse log format from `KOLGATE_LOG_FORMAT`.
#[must_use]
pub fn parse_log_format_from_env() -> Option<LogFormat> {
    non_empty_env(LOG_FORMAT_ENV).and_then(|v| LogFormat::from_arg(&v))
}

/// Parse log file path from `KOLGATE_LOG_FILE`.
#[must_use]
pub fn parse_log_file_from_env() -> Option<PathBuf> {
    non_empty_env(LOG_FILE_ENV).map(PathBuf::from)
}

/// Resolved logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Resolve settings: CLI flag, then env var, then config file, then default.
    ///
    /// `verbose` raises the default level to debug but never lowers an
    /// explicit choice.
    #[must_use]
    pub fn resolve(
        cli_level: Option<&str>,
        json_output: bool,
        verbose: bool,
        config_level: Option<&str>,
    ) -> Self {
        let explicit = cli_level
            .and_then(LogLevel::from_arg)
            .or_else(parse_log_level_from_env)
            .or_else(|| config_level.and_then(LogLevel::from_arg));

        let level = match explicit {
            Some(level) => level,
            None if verbose => LogLevel::Debug,
            None => LogLevel::default(),
        };

        let format = if json_output {
            LogFormat::Json
        } else {
            parse_log_format_from_env().unwrap_or_default()
        };

        Self {
            level,
            format,
            file: parse_log_file_from_env(),
        }
    }
}

fn make_writer(file: Option<&std::fs::File>) -> BoxMakeWriter {
    match file.and_then(|inner| inner.try_clone().ok()) {
        Some(file) => BoxMakeWriter::new(file),
        None => BoxMakeWriter::new(std::io::stderr),
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(settings: &LogSettings) {
    let file = settings.file.as_ref().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kolgate={}", settings.level.as_filter())));
    let writer = make_writer(file.as_ref());

    match settings.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .try_init()
                .ok();
        }
        LogFormat::Compact => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .compact()
                .with_writer(writer)
                .with_target(true)
                .try_init()
                .ok();
        }
        LogFormat::Human => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_target(false)
                .without_time()
                .try_init()
                .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[allow(unsafe_code)]
    fn with_env_var(key: &str, value: Option<&str>, f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap();
        let prior = std::env::var(key).ok();
        unsafe {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        f();
        match prior {
            Some(val) => unsafe {
                std::env::set_var(key, val);
            },
            None => unsafe {
                std::env::remove_var(key);
            },
        }
    }

    #[test]
    fn log_level_aliases() {
        assert_eq!(LogLevel::from_arg("VERBOSE"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_arg("crit"), Some(LogLevel::Error));
        assert_eq!(LogLevel::Warn.as_tracing_level(), Level::WARN);
        assert!(LogLevel::from_arg("loud").is_none());
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::from_arg("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_arg("compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::from_arg("xml"), None);
    }

    #[test]
    fn env_level_beats_config_level() {
        with_env_var(LOG_LEVEL_ENV, Some("trace"), || {
            let settings = LogSettings::resolve(None, false, false, Some("warn"));
            assert_eq!(settings.level, LogLevel::Trace);
        });
    }

    #[test]
    fn cli_level_beats_env_level() {
        with_env_var(LOG_LEVEL_ENV, Some("trace"), || {
            let settings = LogSettings::resolve(Some("info"), false, true, None);
            assert_eq!(settings.level, LogLevel::Info);
        });
    }

    #[test]
    fn verbose_only_raises_default() {
        with_env_var(LOG_LEVEL_ENV, None, || {
            assert_eq!(
                LogSettings::resolve(None, false, true, None).level,
                LogLevel::Debug
            );
            assert_eq!(
                LogSettings::resolve(None, false, true, Some("warn")).level,
                LogLevel::Warn
            );
            assert_eq!(
                LogSettings::resolve(None, false, false, None).level,
                LogLevel::Error
            );
        });
    }

    #[test]
    fn json_output_forces_json_format() {
        with_env_var(LOG_FORMAT_ENV, Some("compact"), || {
            assert_eq!(
                LogSettings::resolve(None, true, false, None).format,
                LogFormat::Json
            );
            assert_eq!(
                LogSettings::resolve(None, false, false, None).format,
                LogFormat::Compact
            );
        });
    }

    #[test]
    fn blank_log_file_is_ignored() {
        with_env_var(LOG_FILE_ENV, Some("   "), || {
            assert_eq!(parse_log_file_from_env(), None);
        });
        with_env_var(LOG_FILE_ENV, Some("/tmp/kolgate.log"), || {
            assert_eq!(
                parse_log_file_from_env(),
                Some(PathBuf::from("/tmp/kolgate.log"))
            );
        });
    }
}
