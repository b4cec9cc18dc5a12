//! Fix suggestions for kolgate errors.
//!
//! Each suggestion carries copy-paste ready commands plus a short
//! explanation of the cause.

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixSuggestion {
    /// Fix commands in order of preference.
    pub commands: Vec<String>,

    /// Why this error occurred.
    pub context: String,

    /// How to avoid it next time.
    pub prevention: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Suggestions for config or pattern file parse errors.
#[must_use]
pub fn config_parse_suggestions(path: &str, message: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("$EDITOR {path}"), "kolgate config".to_string()],
            format!("The file is not valid TOML. The parser reported: {message}"),
        )
        .with_prevention("Run `kolgate config` after editing to see the resolved settings."),
    ]
}

/// Suggestions for an out-of-range config value.
#[must_use]
pub fn config_invalid_suggestions(key: &str, value: &str, message: &str) -> Vec<FixSuggestion> {
    let env_hint = match key {
        "credits.reset_hour" | "KOLGATE_RESET_HOUR" => Some("unset KOLGATE_RESET_HOUR"),
        "KOLGATE_DAILY_CREDITS" => Some("unset KOLGATE_DAILY_CREDITS"),
        _ => None,
    };
    let mut commands = vec!["kolgate config".to_string()];
    if let Some(hint) = env_hint {
        commands.push(hint.to_string());
    }
    vec![FixSuggestion::new(
        commands,
        format!("'{value}' is not accepted for {key}: {message}"),
    )]
}

/// Suggestions for a session id that cannot be used.
#[must_use]
pub fn invalid_session_suggestions(session: &str) -> Vec<FixSuggestion> {
    let cleaned: String = session
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(crate::storage::MAX_SESSION_LEN)
        .collect();
    let commands = if cleaned.is_empty() {
        vec!["kolgate credits show --session default".to_string()]
    } else {
        vec![format!("kolgate credits show --session {cleaned}")]
    };
    vec![FixSuggestion::new(
        commands,
        "Session ids become file names, so only letters, digits, '-' and '_' are allowed.",
    )]
}

// =============================================================================
// Denials
// =============================================================================

/// Suggestions when no credits are left.
#[must_use]
pub fn quota_exhausted_suggestions(resets_in: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["kolgate clock".to_string(), "kolgate credits add-premium 10".to_string()],
            format!("Free credits refill at the daily reset, in {resets_in}."),
        )
        .with_prevention(
            "General questions cost a fraction of a credit; ask broad questions first.",
        ),
    ]
}

/// Suggestions when a feature is denied.
#[must_use]
pub fn access_denied_suggestions(feature: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("kolgate access check {feature} --role brand")],
        "Search needs credits; campaigns and analytics need a brand or admin role; \
         contracts need any role.",
    )]
}

// =============================================================================
// Storage
// =============================================================================

/// Suggestions for a session file that cannot be decoded.
#[must_use]
pub fn corrupt_state_suggestions() -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["kolgate config".to_string(), "kolgate credits reset".to_string()],
        "A saved session file is not valid JSON. `kolgate config` shows where sessions \
         are stored; resetting rewrites the file.",
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_suggestion_builder() {
        let suggestion = FixSuggestion::new(vec!["cmd".to_string()], "ctx")
            .with_prevention("avoid");
        assert_eq!(suggestion.commands, vec!["cmd".to_string()]);
        assert_eq!(suggestion.prevention.as_deref(), Some("avoid"));
    }

    #[test]
    fn invalid_session_suggests_cleaned_id() {
        let suggestions = invalid_session_suggestions("team a/b");
        assert_eq!(
            suggestions[0].commands[0],
            "kolgate credits show --session teamab"
        );
        let suggestions = invalid_session_suggestions("../");
        assert!(suggestions[0].commands[0].ends_with("--session default"));
    }

    #[test]
    fn quota_suggestions_mention_countdown() {
        let suggestions = quota_exhausted_suggestions("3h 10m");
        assert!(suggestions[0].context.contains("3h 10m"));
    }

    #[test]
    fn reset_hour_suggestions_include_env_hint() {
        let suggestions = config_invalid_suggestions("KOLGATE_RESET_HOUR", "25", "out of range");
        assert!(suggestions[0]
            .commands
            .contains(&"unset KOLGATE_RESET_HOUR".to_string()));
    }
}
