//! Isolated workspaces for driving the `kolgate` binary.
//!
//! ```rust,ignore
//! use common::fixtures::Workspace;
//!
//! let ws = Workspace::new();
//! ws.write_session("alice", &session_json(0, 0, 2, "2020-01-01T00:00:00Z"));
//! ws.cmd().args(["send", "hello", "--session", "alice"]).assert().success();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Variables that would leak the developer's settings into a test run.
const SCRUBBED_ENV: &[&str] = &[
    "KOLGATE_FORMAT",
    "KOLGATE_NO_COLOR",
    "KOLGATE_VERBOSE",
    "KOLGATE_PRETTY",
    "KOLGATE_SESSION",
    "KOLGATE_RESET_HOUR",
    "KOLGATE_DAILY_CREDITS",
    "KOLGATE_LOG",
    "KOLGATE_LOG_FORMAT",
    "KOLGATE_LOG_FILE",
    "RUST_LOG",
];

/// A temp directory holding the config file and session data for one test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp workspace"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn session_path(&self, session: &str) -> PathBuf {
        self.dir.path().join("sessions").join(format!("{session}.json"))
    }

    /// `kolgate` pointed at this workspace, with colors off and a clean environment.
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("kolgate").expect("kolgate binary");
        for key in SCRUBBED_ENV {
            cmd.env_remove(key);
        }
        cmd.env("KOLGATE_DATA_DIR", self.dir.path())
            .env("KOLGATE_CONFIG", self.config_path())
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("write config");
    }

    pub fn write_session(&self, session: &str, content: &str) {
        let path = self.session_path(session);
        fs::create_dir_all(path.parent().expect("sessions dir")).expect("create sessions dir");
        fs::write(path, content).expect("write session");
    }

    /// Stored session state, parsed.
    pub fn read_session(&self, session: &str) -> Value {
        let content = fs::read_to_string(self.session_path(session)).expect("read session");
        serde_json::from_str(&content).expect("session is JSON")
    }
}

/// Stored credit state in the on-disk format.
pub fn session_json(free: u32, premium: u32, counter: u32, last_reset: &str) -> String {
    format!(
        r#"{{"freeCredits":{free},"premiumCredits":{premium},"generalQuestionCounter":{counter},"lastReset":"{last_reset}"}}"#
    )
}

/// Parse the JSON envelope printed on stdout and return its `data` field.
pub fn envelope_data(stdout: &[u8]) -> Value {
    let envelope: Value = serde_json::from_slice(stdout).expect("stdout is a JSON envelope");
    assert_eq!(envelope["schemaVersion"], "kolgate.v1");
    envelope["data"].clone()
}
