//! Config command implementation.

use crate::cli::CommandContext;
use crate::core::models::{ConfigEntry, ConfigReport};
use crate::error::Result;
use crate::render::human;
use crate::storage::{ConfigSource, CreditStateStore, ResolvedConfig};

fn entry(key: &str, value: impl ToString, source: impl ToString) -> ConfigEntry {
    ConfigEntry {
        key: key.to_string(),
        value: value.to_string(),
        source: source.to_string(),
    }
}

/// Describe the resolved settings and where each came from.
///
/// # Errors
///
/// Returns an error if the sessions directory cannot be listed.
pub fn report(config: &ResolvedConfig, store: &CreditStateStore) -> Result<ConfigReport> {
    let sources = &config.sources;
    let policy = &config.policy;
    let file_or_default = if config.config_path.exists() {
        ConfigSource::ConfigFile
    } else {
        ConfigSource::Default
    };
    let format = match config.format {
        crate::cli::OutputFormat::Human => "human",
        crate::cli::OutputFormat::Json => "json",
    };
    let patterns = config
        .patterns_file
        .as_ref()
        .map_or_else(|| "builtin".to_string(), |p| p.display().to_string());

    let entries = vec![
        entry("output.format", format, sources.format),
        entry("output.no_color", config.no_color, sources.no_color),
        entry("output.pretty", config.pretty, sources.pretty),
        entry("general.verbose", config.verbose, sources.verbose),
        entry("session", &config.session, sources.session),
        entry(
            "credits.daily_free_credits",
            policy.daily_free_credits,
            sources.daily_free_credits,
        ),
        entry(
            "credits.general_questions_per_credit",
            policy.general_questions_per_credit,
            file_or_default,
        ),
        entry("credits.reset_hour", policy.clock.reset_hour(), sources.reset_hour),
        entry(
            "credits.utc_offset_minutes",
            policy.clock.utc_offset_minutes(),
            file_or_default,
        ),
        entry(
            "credits.date_comparison",
            policy.clock.comparison().as_str(),
            file_or_default,
        ),
        entry("classifier.patterns_file", patterns, file_or_default),
    ];

    Ok(ConfigReport {
        config_path: config.config_path.clone(),
        config_exists: config.config_path.exists(),
        sessions_dir: store.dir().to_path_buf(),
        sessions: store.list()?,
        entries,
    })
}

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if the sessions directory cannot be listed.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let report = report(&ctx.config, &ctx.store())?;
    ctx.emit("config", &report, human::render_config)
}
