//! Report payloads produced by CLI commands.
//!
//! Every command builds one of these and hands it to the renderer, so the
//! human and JSON outputs always describe the same data.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::access::{AccessContext, Feature, Redirect};
use crate::core::classifier::Classification;
use crate::core::credits::{CreditState, MessageOutcome};
use crate::core::reset_clock::{DateComparison, ResetCountdown};
use crate::core::tasks::{Task, TaskUpdate};

/// Schema identifier carried by every JSON envelope.
pub const SCHEMA_VERSION: &str = "kolgate.v1";

// =============================================================================
// Classification & Credits
// =============================================================================

/// Result of `kolgate classify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyReport {
    pub message: String,
    pub patterns_version: String,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Result of `kolgate send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReport {
    pub session: String,
    pub message: String,
    #[serde(flatten)]
    pub outcome: MessageOutcome,
}

/// Result of the `kolgate credits` subcommands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsReport {
    pub session: String,
    /// Subcommand that produced the report (`show`, `reset`, ...).
    pub action: String,
    pub state: CreditState,
    pub credits_left: u32,
    /// Whether loading the session applied a daily reset.
    pub was_reset: bool,
    pub next_reset_at: DateTime<Utc>,
    pub resets_in: ResetCountdown,
}

/// Result of `kolgate clock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockReport {
    pub now: DateTime<Utc>,
    pub reset_hour: u32,
    pub utc_offset_minutes: i32,
    pub comparison: DateComparison,
    pub next_reset_at: DateTime<Utc>,
    pub resets_in: ResetCountdown,
    pub session: String,
    /// `None` when the session has never been saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reset: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_reset: Option<bool>,
}

// =============================================================================
// Access
// =============================================================================

/// Result of `kolgate access check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReport {
    pub feature: String,
    pub allowed: bool,
    pub context: AccessContext,
    pub accessible_features: Vec<Feature>,
}

/// Result of `kolgate access redirect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectReport {
    pub path: String,
    pub redirect: Redirect,
    pub context: AccessContext,
}

// =============================================================================
// Tasks
// =============================================================================

/// Result of `kolgate tasks plan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPlan {
    pub request: String,
    pub subtasks: Vec<String>,
}

/// Result of `kolgate tasks run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunReport {
    pub task: Task,
    /// Every notification observed while the task ran, in order.
    pub updates: Vec<TaskUpdate>,
}

// =============================================================================
// Config
// =============================================================================

/// One resolved setting and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

/// Result of `kolgate config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    pub config_path: PathBuf,
    pub config_exists: bool,
    pub sessions_dir: PathBuf,
    pub sessions: Vec<String>,
    pub entries: Vec<ConfigEntry>,
}

// =============================================================================
// Robot Envelope
// =============================================================================

/// Top-level JSON envelope for robot mode output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,

    #[serde(default)]
    pub errors: Vec<String>,

    pub meta: RobotMeta,
}

/// Metadata for robot output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotMeta {
    pub format: String,
    pub version: String,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self::with_errors(command, data, Vec::new())
    }

    /// Create with errors.
    pub fn with_errors(command: impl Into<String>, data: T, errors: Vec<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors,
            meta: RobotMeta {
                format: "json".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}
