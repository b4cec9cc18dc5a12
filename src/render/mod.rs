//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::Result;

/// Output settings shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub no_color: bool,
}

impl RenderOptions {
    #[must_use]
    pub const fn new(format: OutputFormat, pretty: bool, no_color: bool) -> Self {
        Self {
            format,
            pretty,
            no_color,
        }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

/// Render a command payload in the selected format.
///
/// JSON output wraps `data` in the robot envelope; human output is produced
/// by `human`, which receives the `no_color` flag.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render<T, F>(command: &str, data: &T, options: RenderOptions, human: F) -> Result<String>
where
    T: Serialize,
    F: FnOnce(&T, bool) -> String,
{
    match options.format {
        OutputFormat::Human => Ok(human(data, options.no_color)),
        OutputFormat::Json => robot::render_envelope(command, data, options.pretty)
            .map(|mut json| {
                json.push('\n');
                json
            }),
    }
}
