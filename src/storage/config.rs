//! Configuration file loading and management.
//!
//! Loads configuration from:
//! - Linux: `~/.config/kolgate/config.toml`
//! - macOS: `~/Library/Application Support/io.kolgate.kolgate/config.toml`
//! - Windows: `%APPDATA%/kolgate/kolgate/config/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `KOLGATE_FORMAT`: Output format (human, json)
//! - `KOLGATE_NO_COLOR` or `NO_COLOR`: Disable colors (1, true, yes)
//! - `KOLGATE_VERBOSE`: Enable verbose output (1, true, yes)
//! - `KOLGATE_PRETTY`: Pretty-print JSON output (1, true, yes)
//! - `KOLGATE_SESSION`: Session whose credits are used
//! - `KOLGATE_RESET_HOUR`: Daily reset hour (0-23)
//! - `KOLGATE_DAILY_CREDITS`: Free credits restored each day
//! - `KOLGATE_CONFIG`: Override config file path
//!
//! ## Example
//!
//! ```toml
//! [credits]
//! daily_free_credits = 5
//! general_questions_per_credit = 3
//! reset_hour = 4
//! utc_offset_minutes = 480
//! date_comparison = "calendar"
//!
//! [classifier]
//! patterns_file = "/etc/kolgate/patterns.toml"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::AppPaths;
use super::credit_state::validate_session_id;
use crate::cli::args::{Cli, OutputFormat};
use crate::core::classifier::{PatternSets, QueryClassifier};
use crate::core::credits::{
    CreditPolicy, DEFAULT_DAILY_FREE_CREDITS, DEFAULT_GENERAL_QUESTIONS_PER_CREDIT,
};
use crate::core::reset_clock::{DEFAULT_RESET_HOUR, DateComparison, ResetClock};
use crate::error::{KolgateError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable for output format.
pub const ENV_FORMAT: &str = "KOLGATE_FORMAT";
/// Environment variable to disable colors.
pub const ENV_NO_COLOR: &str = "KOLGATE_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";
/// Environment variable for verbose output.
pub const ENV_VERBOSE: &str = "KOLGATE_VERBOSE";
/// Environment variable for pretty JSON output.
pub const ENV_PRETTY: &str = "KOLGATE_PRETTY";
/// Environment variable selecting the session.
pub const ENV_SESSION: &str = "KOLGATE_SESSION";
/// Environment variable overriding the reset hour.
pub const ENV_RESET_HOUR: &str = "KOLGATE_RESET_HOUR";
/// Environment variable overriding the daily free allowance.
pub const ENV_DAILY_CREDITS: &str = "KOLGATE_DAILY_CREDITS";
/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "KOLGATE_CONFIG";

/// Session used when none is configured.
pub const DEFAULT_SESSION: &str = "default";

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Output format.
    pub format: OutputFormat,
    /// Whether to disable colored output.
    pub no_color: bool,
    /// Whether verbose logging is enabled.
    pub verbose: bool,
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
    /// Session whose credit state is read and written.
    pub session: String,
    /// Quota parameters.
    pub policy: CreditPolicy,
    /// Replacement classifier patterns, if configured.
    pub patterns_file: Option<PathBuf>,
    /// Log level from the config file (CLI and env are handled by logging).
    pub log_level: Option<String>,
    /// Config file that was consulted.
    pub config_path: PathBuf,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub format: ConfigSource,
    pub no_color: ConfigSource,
    pub verbose: ConfigSource,
    pub pretty: ConfigSource,
    pub session: ConfigSource,
    pub reset_hour: ConfigSource,
    pub daily_free_credits: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file exists but is invalid
    /// - Any resolved value is out of range
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config_path = Self::config_path(cli);
        let config = Config::load_from(&config_path)?;
        config.validate()?;

        let mut sources = ConfigSources::default();

        let format = Self::resolve_format(cli, &config, &mut sources.format)?;
        let no_color = Self::resolve_no_color(cli, &config, &mut sources.no_color);
        let verbose = Self::resolve_verbose(cli, &mut sources.verbose);
        let pretty = Self::resolve_pretty(cli, &config, &mut sources.pretty);
        let session = Self::resolve_session(cli, &config, &mut sources.session)?;
        let reset_hour = Self::resolve_u32(
            ENV_RESET_HOUR,
            config.credits.reset_hour,
            DEFAULT_RESET_HOUR,
            &mut sources.reset_hour,
        )?;
        let daily_free_credits = Self::resolve_u32(
            ENV_DAILY_CREDITS,
            config.credits.daily_free_credits,
            DEFAULT_DAILY_FREE_CREDITS,
            &mut sources.daily_free_credits,
        )?;

        let clock = ResetClock::new(reset_hour)?
            .with_offset_minutes(config.credits.utc_offset_minutes)?
            .with_comparison(config.credits.date_comparison);
        let policy = CreditPolicy::new(
            daily_free_credits,
            config.credits.general_questions_per_credit,
            clock,
        )?;

        Ok(Self {
            format,
            no_color,
            verbose,
            pretty,
            session,
            policy,
            patterns_file: config.classifier.patterns_file.clone(),
            log_level: config.general.log_level.clone(),
            config_path,
            sources,
        })
    }

    /// Config file path: `--config`, then `KOLGATE_CONFIG`, then the default location.
    fn config_path(cli: &Cli) -> PathBuf {
        if let Some(path) = &cli.config {
            return path.clone();
        }
        if let Ok(path) = std::env::var(ENV_CONFIG) {
            if !path.trim().is_empty() {
                return PathBuf::from(path.trim());
            }
        }
        Config::config_path()
    }

    /// Build the classifier from the configured pattern file or the built-ins.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern file cannot be loaded or compiled.
    pub fn classifier(&self) -> Result<QueryClassifier> {
        let sets = match &self.patterns_file {
            Some(path) => PatternSets::load_from(path)?,
            None => PatternSets::builtin(),
        };
        QueryClassifier::new(&sets)
    }

    /// Resolve output format setting.
    fn resolve_format(
        cli: &Cli,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<OutputFormat> {
        // 1. CLI --json flag (shorthand)
        if cli.json {
            *source = ConfigSource::Cli;
            return Ok(OutputFormat::Json);
        }

        // clap fills in the default, so a non-default value means the flag was given
        if cli.format != OutputFormat::Human {
            *source = ConfigSource::Cli;
            return Ok(cli.format);
        }

        // 2. Environment variable
        if let Ok(format_env) = std::env::var(ENV_FORMAT) {
            *source = ConfigSource::Env;
            return Self::parse_format(&format_env);
        }

        // 3. Config file
        if let Some(ref format_str) = config.output.format {
            *source = ConfigSource::ConfigFile;
            return Self::parse_format(format_str);
        }

        // 4. Default
        *source = ConfigSource::Default;
        Ok(OutputFormat::Human)
    }

    /// Parse a format string into `OutputFormat`.
    fn parse_format(s: &str) -> Result<OutputFormat> {
        match s.trim().to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(KolgateError::Config(format!(
                "Invalid format '{s}'. Valid formats: human, json"
            ))),
        }
    }

    /// Resolve `no_color` setting.
    fn resolve_no_color(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.no_color {
            *source = ConfigSource::Cli;
            return true;
        }

        if is_env_truthy(ENV_NO_COLOR) || std::env::var(ENV_NO_COLOR_STD).is_ok() {
            *source = ConfigSource::Env;
            return true;
        }

        // Inverted: config.output.color = false means no_color = true
        if !config.output.color {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    /// Resolve verbose setting.
    fn resolve_verbose(cli: &Cli, source: &mut ConfigSource) -> bool {
        if cli.verbose {
            *source = ConfigSource::Cli;
            return true;
        }

        if is_env_truthy(ENV_VERBOSE) {
            *source = ConfigSource::Env;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    /// Resolve pretty setting.
    fn resolve_pretty(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.pretty {
            *source = ConfigSource::Cli;
            return true;
        }

        if is_env_truthy(ENV_PRETTY) {
            *source = ConfigSource::Env;
            return true;
        }

        if config.output.pretty {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    /// Resolve the session id.
    fn resolve_session(cli: &Cli, config: &Config, source: &mut ConfigSource) -> Result<String> {
        let (session, from) = if let Some(session) = &cli.session {
            (session.clone(), ConfigSource::Cli)
        } else if let Ok(session) = std::env::var(ENV_SESSION) {
            (session, ConfigSource::Env)
        } else if let Some(session) = &config.session.default_session {
            (session.clone(), ConfigSource::ConfigFile)
        } else {
            (DEFAULT_SESSION.to_string(), ConfigSource::Default)
        };
        validate_session_id(&session)?;
        *source = from;
        Ok(session)
    }

    /// Resolve a numeric credits setting: env var, then config file, then default.
    fn resolve_u32(
        env: &str,
        file_value: Option<u32>,
        default: u32,
        source: &mut ConfigSource,
    ) -> Result<u32> {
        if let Ok(raw) = std::env::var(env) {
            let value = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| KolgateError::ConfigInvalid {
                    key: env.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                })?;
            *source = ConfigSource::Env;
            return Ok(value);
        }

        if let Some(value) = file_value {
            *source = ConfigSource::ConfigFile;
            return Ok(value);
        }

        *source = ConfigSource::Default;
        Ok(default)
    }
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var: &str) -> bool {
    std::env::var(var)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

// =============================================================================
// Config File
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub output: OutputConfig,
    pub credits: CreditsConfig,
    pub classifier: ClassifierConfig,
    pub session: SessionConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json).
    pub format: Option<String>,
    /// Whether to use colors in output.
    pub color: bool,
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            pretty: false,
        }
    }
}

/// Quota settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditsConfig {
    /// Free credits restored at each reset. `None` uses the built-in default.
    pub daily_free_credits: Option<u32>,
    /// General messages amortized into one credit.
    pub general_questions_per_credit: u32,
    /// Daily reset hour (0-23). `None` uses the built-in default.
    pub reset_hour: Option<u32>,
    /// Offset east of UTC, in minutes, in which the reset hour is read.
    pub utc_offset_minutes: i32,
    /// How staleness is decided (`calendar` or `field-wise`).
    pub date_comparison: DateComparison,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            daily_free_credits: None,
            general_questions_per_credit: DEFAULT_GENERAL_QUESTIONS_PER_CREDIT,
            reset_hour: None,
            utc_offset_minutes: 0,
            date_comparison: DateComparison::Calendar,
        }
    }
}

/// Classifier settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// TOML file replacing the built-in pattern sets.
    pub patterns_file: Option<PathBuf>,
}

/// Session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session used when neither `--session` nor `KOLGATE_SESSION` is set.
    pub default_session: Option<String>,
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error only if the file exists but is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| KolgateError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Get the default config file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        AppPaths::new().config_file()
    }

    /// Validate configuration values.
    ///
    /// Checks that:
    /// - Output format is valid (human, json)
    /// - Reset hour is 0-23 and the UTC offset is under a day
    /// - At least one general question is needed per credit
    /// - The default session id is usable as a file name
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.output.format {
            if !["human", "json"].contains(&format.trim().to_lowercase().as_str()) {
                return Err(KolgateError::Config(format!(
                    "Invalid format \"{format}\". Valid formats: human, json"
                )));
            }
        }

        if let Some(hour) = self.credits.reset_hour {
            ResetClock::new(hour)?;
        }
        ResetClock::default().with_offset_minutes(self.credits.utc_offset_minutes)?;

        if self.credits.general_questions_per_credit == 0 {
            return Err(KolgateError::ConfigInvalid {
                key: "credits.general_questions_per_credit".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if let Some(session) = &self.session.default_session {
            validate_session_id(session)?;
        }

        Ok(())
    }
}
