//! Robot-mode output (JSON).
//!
//! Provides stable, token-efficient output for scripts and agents. Every
//! payload is wrapped in a [`RobotOutput`] envelope.

use serde::Serialize;

use crate::core::models::RobotOutput;
use crate::error::Result;

/// Render any serializable value as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(output: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(json)
}

/// Wrap `data` in the envelope for `command` and render it.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_envelope<T: Serialize>(command: &str, data: &T, pretty: bool) -> Result<String> {
    render_json(&RobotOutput::new(command, data), pretty)
}
