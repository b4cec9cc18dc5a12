//! CLI argument parsing and command dispatch.

pub mod access;
pub mod args;
pub mod classify;
pub mod clock;
pub mod config;
pub mod credits;
pub mod send;
pub mod tasks;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use args::{Cli, Commands, OutputFormat};

use crate::error::Result;
use crate::render::{self, RenderOptions};
use crate::storage::{AppPaths, CreditStateStore, ResolvedConfig};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: ResolvedConfig,
    pub paths: AppPaths,
    pub options: RenderOptions,
    /// Instant every decision in this invocation is made at.
    pub now: DateTime<Utc>,
}

impl CommandContext {
    #[must_use]
    pub const fn new(
        config: ResolvedConfig,
        paths: AppPaths,
        options: RenderOptions,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            paths,
            options,
            now,
        }
    }

    /// Session state store under the data directory.
    #[must_use]
    pub fn store(&self) -> CreditStateStore {
        CreditStateStore::new(&self.paths)
    }

    /// Render and print a command payload to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn emit<T, F>(&self, command: &str, data: &T, human: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T, bool) -> String,
    {
        print!("{}", render::render(command, data, self.options, human)?);
        Ok(())
    }
}

/// Run one subcommand.
///
/// # Errors
///
/// Propagates the command's error; denials map to exit code 5.
pub async fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Classify(args) => classify::execute(&args, ctx),
        Commands::Send(args) => send::execute(&args, ctx),
        Commands::Credits(cmd) => credits::execute(cmd, ctx),
        Commands::Clock => clock::execute(ctx),
        Commands::Access(cmd) => access::execute(&cmd, ctx),
        Commands::Tasks(cmd) => tasks::execute(&cmd, ctx).await,
        Commands::Config => config::execute(ctx),
    }
}
