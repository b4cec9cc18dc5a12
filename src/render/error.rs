//! Error rendering for kolgate.
//!
//! Text output for terminals and structured JSON for `--format json`.

use colored::Colorize;

use crate::cli::args::OutputFormat;
use crate::error::KolgateError;

// =============================================================================
// Public API
// =============================================================================

/// Render an error for stderr according to the output format.
#[must_use]
pub fn render_error(error: &KolgateError, format: OutputFormat, no_color: bool, pretty: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Human => render_text(error, no_color),
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &KolgateError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| render_text(error, true))
}

// =============================================================================
// Text Rendering
// =============================================================================

fn render_text(error: &KolgateError, no_color: bool) -> String {
    let suggestions = error.fix_suggestions();
    let header = format!("Error [{}]: {error}", error.error_code());
    let mut lines = vec![if no_color { header } else { header.red().bold().to_string() }];

    if let Some(suggestion) = suggestions.first() {
        if let Some(cmd) = suggestion.commands.first() {
            lines.push(format!("Fix: {cmd}"));
        }
        if !suggestion.context.is_empty() {
            lines.push(if no_color {
                suggestion.context.clone()
            } else {
                suggestion.context.dimmed().to_string()
            });
        }
    }

    lines.join("\n")
}

// =============================================================================
// JSON Rendering
// =============================================================================

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorJson {
    error_code: String,
    category: String,
    message: String,
    exit_code: i32,
    is_retryable: bool,
    suggestions: Vec<SuggestionJson>,
}

#[derive(serde::Serialize)]
struct SuggestionJson {
    commands: Vec<String>,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prevention: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &KolgateError) -> Self {
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            exit_code: error.exit_code().into(),
            is_retryable: error.is_retryable(),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_includes_code_and_fix() {
        let err = KolgateError::QuotaExhausted {
            resets_in: "2h 0m".to_string(),
        };
        let out = render_error(&err, OutputFormat::Human, true, false);
        assert!(out.starts_with("Error [KOL-D001]: credit limit reached"));
        assert!(out.contains("Fix: kolgate clock"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn json_is_structured() {
        let err = KolgateError::AccessDenied {
            feature: "analytics".to_string(),
        };
        let out = render_error(&err, OutputFormat::Json, true, false);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["errorCode"], "KOL-D002");
        assert_eq!(value["exitCode"], 5);
        assert_eq!(value["category"], "Request denied");
        assert!(value["suggestions"].as_array().is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn errors_without_suggestions_render_header_only() {
        let err = KolgateError::Io(std::io::Error::other("disk full"));
        let out = render_error(&err, OutputFormat::Human, true, false);
        assert_eq!(out, "Error [KOL-S002]: I/O error: disk full");
    }
}
