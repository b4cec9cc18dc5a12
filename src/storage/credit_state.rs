//! Per-session persistence of [`CreditState`].
//!
//! Each session is one JSON file under `<data>/sessions/`. Writes go to a
//! temp file in the same directory and are renamed into place, so a reader
//! never sees a half-written state.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::credits::{CreditPolicy, CreditState, CreditStore};
use crate::error::{KolgateError, Result};
use crate::storage::paths::AppPaths;

/// Longest accepted session id.
pub const MAX_SESSION_LEN: usize = 64;

/// Check that a session id is safe to use as a file name.
///
/// # Errors
///
/// Returns `InvalidSession` unless the id is 1-64 characters of `[A-Za-z0-9_-]`.
pub fn validate_session_id(session: &str) -> Result<()> {
    let valid = !session.is_empty()
        && session.len() <= MAX_SESSION_LEN
        && session
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(KolgateError::InvalidSession(session.to_string()))
    }
}

/// JSON-file store for session credit state.
#[derive(Debug, Clone)]
pub struct CreditStateStore {
    dir: PathBuf,
}

impl CreditStateStore {
    /// Store rooted at the application's sessions directory.
    #[must_use]
    pub fn new(paths: &AppPaths) -> Self {
        Self::in_dir(paths.sessions_dir())
    }

    /// Store rooted at an explicit directory.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `session`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSession` for unsafe ids.
    pub fn path_for(&self, session: &str) -> Result<PathBuf> {
        validate_session_id(session)?;
        Ok(self.dir.join(format!("{session}.json")))
    }

    /// Load a session's state, `None` if it was never saved.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid ids, unreadable files or corrupt JSON.
    /// A corrupt file is not replaced with a fresh allowance.
    pub fn load(&self, session: &str) -> Result<Option<CreditState>> {
        let path = self.path_for(session)?;
        if !path.exists() {
            tracing::debug!(?path, "No stored credit state");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let state = serde_json::from_str(&content).map_err(|e| {
            tracing::warn!(?path, error = %e, "Corrupt credit state");
            e
        })?;
        Ok(Some(state))
    }

    /// Load a session into a store, starting fresh if nothing was saved.
    ///
    /// A stored general-question counter at or past the policy threshold is
    /// clamped to one below it.
    ///
    /// # Errors
    ///
    /// See [`CreditStateStore::load`].
    pub fn open(&self, session: &str, policy: CreditPolicy, now: DateTime<Utc>) -> Result<CreditStore> {
        Ok(match self.load(session)? {
            Some(mut state) => {
                let stored = state.general_question_counter;
                if state.clamp_counter(policy.general_questions_per_credit) {
                    tracing::warn!(
                        session,
                        stored,
                        threshold = policy.general_questions_per_credit,
                        "General question counter out of range, clamped"
                    );
                }
                CreditStore::new(state, policy)
            }
            None => CreditStore::fresh(policy, now),
        })
    }

    /// Persist a session's state atomically.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid ids or if the file cannot be written.
    pub fn save(&self, session: &str, state: &CreditState) -> Result<()> {
        let path = self.path_for(session)?;
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(state)?;
        write_atomic(&path, content.as_bytes())?;
        tracing::debug!(?path, free = state.free_credits, "Credit state saved");
        Ok(())
    }

    /// Saved session ids, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut sessions = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_session_id(stem).is_ok() {
                    sessions.push(stem.to_string());
                }
            }
        }
        sessions.sort();
        Ok(sessions)
    }
}

/// Write bytes via temp file + rename in the same directory.
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("session"),
        std::process::id()
    ));

    {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::QueryClass;
    use crate::core::credits::CreditBalance;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn session_id_validation() {
        assert!(validate_session_id("alice_01-x").is_ok());
        let long = "x".repeat(65);
        for bad in ["", "../etc", "a/b", "with space", "é", long.as_str()] {
            assert!(validate_session_id(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn missing_session_loads_none_and_opens_fresh() {
        let dir = TempDir::new().unwrap();
        let store = CreditStateStore::in_dir(dir.path());
        assert_eq!(store.load("nobody").unwrap(), None);

        let credits = store.open("nobody", CreditPolicy::default(), now()).unwrap();
        assert_eq!(credits.state().free_credits, 5);
        assert_eq!(credits.state().last_reset, now());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = CreditStateStore::in_dir(dir.path().join("sessions"));
        let mut state = CreditState::new(2, now());
        state.premium_credits = 7;
        state.general_question_counter = 1;

        store.save("bob", &state).unwrap();
        assert_eq!(store.load("bob").unwrap(), Some(state));
        assert_eq!(store.list().unwrap(), vec!["bob".to_string()]);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = CreditStateStore::in_dir(dir.path());
        store.save("carol", &CreditState::new(1, now())).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["carol.json".to_string()]);
    }

    #[test]
    fn corrupt_state_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("dave.json"), "{not json").unwrap();
        let store = CreditStateStore::in_dir(dir.path());
        assert!(matches!(store.load("dave"), Err(KolgateError::Json(_))));
    }

    #[test]
    fn open_clamps_counter_past_threshold() {
        let dir = TempDir::new().unwrap();
        let store = CreditStateStore::in_dir(dir.path());
        let mut stale = CreditState::new(1, now());
        stale.general_question_counter = 7;
        store.save("erin", &stale).unwrap();

        let mut credits = store.open("erin", CreditPolicy::default(), now()).unwrap();
        assert_eq!(credits.state().general_question_counter, 2);

        let outcome = credits.consume(QueryClass::General);
        assert_eq!(outcome.charged, Some(CreditBalance::Free));
        assert_eq!(outcome.state.general_question_counter, 0);
    }

    #[test]
    fn open_accepts_counter_at_u32_max() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("fred.json"),
            r#"{"freeCredits":1,"generalQuestionCounter":4294967295,"lastReset":"2025-03-10T12:00:00Z"}"#,
        )
        .unwrap();
        let store = CreditStateStore::in_dir(dir.path());

        let credits = store.open("fred", CreditPolicy::default(), now()).unwrap();
        assert_eq!(credits.state().general_question_counter, 2);
    }

    #[test]
    fn invalid_session_never_touches_disk() {
        let dir = TempDir::new().unwrap();
        let store = CreditStateStore::in_dir(dir.path());
        assert!(matches!(
            store.save("../escape", &CreditState::new(1, now())),
            Err(KolgateError::InvalidSession(_))
        ));
    }
}
