//! Test utilities for kolgate.
//!
//! Provides shared helpers, test data factories, and assertion macros
//! for use across all test modules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kolgate::test_utils::*;
//!
//! let dir = TestDir::new();
//! dir.create_file("config/config.toml", &make_test_config_toml(7));
//! let store = dir.credit_store();
//! store.save("alice", &make_test_state(2)).unwrap();
//! ```

#![allow(clippy::missing_panics_doc)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};

use crate::core::classifier::QueryClassifier;
use crate::core::credits::{CreditPolicy, CreditState};
use crate::core::reset_clock::ResetClock;
use crate::storage::{AppPaths, CreditStateStore};

// =============================================================================
// Test Data Factories
// =============================================================================

/// Fixed instant used by tests: 2025-03-10 12:00 UTC, after the 04:00 reset.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
        .single()
        .expect("valid test timestamp")
}

/// Credit state last reset at [`test_now`].
#[must_use]
pub fn make_test_state(free_credits: u32) -> CreditState {
    CreditState::new(free_credits, test_now())
}

/// Policy with the given allowance and amortization threshold, resetting at 04:00 UTC.
#[must_use]
pub fn make_test_policy(daily_free_credits: u32, general_questions_per_credit: u32) -> CreditPolicy {
    let clock = ResetClock::new(4).expect("valid reset hour");
    CreditPolicy::new(daily_free_credits, general_questions_per_credit, clock)
        .expect("valid test policy")
}

/// Classifier over the built-in pattern sets.
#[must_use]
pub fn make_test_classifier() -> QueryClassifier {
    QueryClassifier::builtin().expect("built-in patterns compile")
}

/// Config file content overriding the reset hour.
#[must_use]
pub fn make_test_config_toml(reset_hour: u32) -> String {
    format!(
        r#"[general]
log_level = "warn"

[output]
color = false

[credits]
daily_free_credits = 5
general_questions_per_credit = 3
reset_hour = {reset_hour}
"#
    )
}

/// Pattern file content with a single keyword.
#[must_use]
pub fn make_test_patterns_toml(keyword: &str) -> String {
    format!("version = \"test-patterns\"\nkeywords = [\"{keyword}\"]\n")
}

// =============================================================================
// TestDir - Isolated Temporary Directory
// =============================================================================

/// An isolated temporary directory for tests.
///
/// Laid out like [`AppPaths::under`]: `config/` and `data/sessions/`.
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Application paths rooted here.
    #[must_use]
    pub fn paths(&self) -> AppPaths {
        AppPaths::under(self.inner.path())
    }

    /// Session store rooted here.
    #[must_use]
    pub fn credit_store(&self) -> CreditStateStore {
        CreditStateStore::new(&self.paths())
    }

    /// Create a file in the temporary directory with the given content.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.inner.path().join(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
        path
    }

    /// Check if a file exists in the temporary directory.
    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string does NOT contain ANSI escape codes.
#[macro_export]
macro_rules! assert_no_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            !text.contains('\x1b'),
            "Expected string to NOT contain ANSI escape codes.\n\nActual string:\n{:?}",
            text
        );
    };
}
