//! Phase logging for integration tests.
//!
//! Output goes to stderr (shown by `cargo test -- --nocapture`). Set
//! `TEST_LOG_JSON=1` for one JSON object per line.
//!
//! ```rust,ignore
//! let log = TestLogger::new("send_spends_credit");
//! log.phase("setup");
//! log.phase("execute");
//! log.finish_ok();
//! ```

#![allow(dead_code)]

use std::cell::RefCell;
use std::time::Instant;

use chrono::Utc;
use serde_json::json;

use super::log_capture::TestLogCapture;

fn json_mode() -> bool {
    std::env::var("TEST_LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Per-test logger that tracks the current phase and elapsed time.
pub struct TestLogger {
    name: String,
    started: Instant,
    phase: RefCell<Option<String>>,
}

impl TestLogger {
    pub fn new(name: &str) -> Self {
        let logger = Self {
            name: name.to_string(),
            started: Instant::now(),
            phase: RefCell::new(None),
        };
        logger.emit("INFO", "started");
        logger
    }

    /// Logger plus a capture of tracing events for the same test.
    pub fn with_capture(name: &str) -> (Self, TestLogCapture) {
        let capture = TestLogCapture::start();
        (Self::new(name), capture)
    }

    pub fn phase(&self, phase: &str) {
        *self.phase.borrow_mut() = Some(phase.to_string());
        self.emit("INFO", &format!("phase: {phase}"));
    }

    pub fn info(&self, message: &str) {
        self.emit("INFO", message);
    }

    pub fn debug(&self, message: &str) {
        self.emit("DEBUG", message);
    }

    pub fn finish_ok(self) {
        self.emit("INFO", "passed");
    }

    pub fn finish_err(self, reason: &str) {
        self.emit("ERROR", &format!("failed: {reason}"));
    }

    fn emit(&self, level: &str, message: &str) {
        let elapsed_ms = self.started.elapsed().as_millis();
        let phase = self.phase.borrow().clone();
        if json_mode() {
            let entry = json!({
                "timestamp": Utc::now().to_rfc3339(),
                "level": level,
                "test": self.name,
                "phase": phase,
                "durationMs": elapsed_ms,
                "message": message,
            });
            eprintln!("{entry}");
        } else {
            let phase = phase.map(|p| format!("[{p}] ")).unwrap_or_default();
            eprintln!("{level:5} {} {phase}{message} ({elapsed_ms}ms)", self.name);
        }
    }
}
