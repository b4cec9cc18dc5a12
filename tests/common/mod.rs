//! Common test utilities and fixtures for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: isolated workspaces and a preconfigured `kolgate` command
//! - `log_capture`: in-process tracing capture
//! - `logger`: phase and duration logging for long e2e tests

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;
pub mod logger;
