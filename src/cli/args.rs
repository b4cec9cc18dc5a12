//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::access::{AccessContext, OnboardingStatus, Role};

/// kolgate - credit quota and access control for KOL marketing.
#[derive(Parser, Debug)]
#[command(name = "kolgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Session whose credits are read and written
    #[arg(long, value_name = "ID", global = true)]
    pub session: Option<String>,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a message as specific or general
    Classify(MessageArgs),

    /// Send a message: apply any daily reset, classify it and charge credits
    Send(MessageArgs),

    /// Inspect or adjust a session's credits
    #[command(subcommand)]
    Credits(CreditsCommand),

    /// Show the countdown to the next daily reset
    Clock,

    /// Evaluate feature access and redirects
    #[command(subcommand)]
    Access(AccessCommand),

    /// Plan or run compound tasks
    #[command(subcommand)]
    Tasks(TasksCommand),

    /// Show resolved configuration and where each value came from
    Config,
}

/// A free-text chat message.
#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Message text
    #[arg(value_name = "MESSAGE")]
    pub message: String,
}

/// Credit subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditsCommand {
    /// Show the current balance (applies a pending daily reset)
    Show,

    /// Restore free credits and clear the general-question counter
    Reset {
        /// Free credits after the reset (defaults to the daily allowance)
        #[arg(value_name = "N")]
        amount: Option<u32>,
    },

    /// Set free credits to an exact amount
    Set {
        #[arg(value_name = "N")]
        amount: u32,
    },

    /// Add free credits
    Add {
        #[arg(value_name = "N")]
        amount: u32,
    },

    /// Add purchased credits (kept across daily resets)
    AddPremium {
        #[arg(value_name = "N")]
        amount: u32,
    },
}

impl CreditsCommand {
    /// Name used in report payloads.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Reset { .. } => "reset",
            Self::Set { .. } => "set",
            Self::Add { .. } => "add",
            Self::AddPremium { .. } => "add-premium",
        }
    }
}

/// Access subcommands.
#[derive(Subcommand, Debug)]
pub enum AccessCommand {
    /// Check whether a feature is accessible (exit code 5 when denied)
    Check {
        /// Feature name (search, campaigns, analytics, contracts)
        #[arg(value_name = "FEATURE")]
        feature: String,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Show where the user should be sent
    Redirect {
        #[command(flatten)]
        user: UserArgs,
    },
}

/// Describes the user an access decision is made for.
#[derive(Args, Debug, Clone, Default)]
pub struct UserArgs {
    /// User role (brand, kol, admin); unknown roles count as no role
    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Evaluate as a signed-out visitor
    #[arg(long, conflicts_with_all = ["role", "onboarding"])]
    pub anonymous: bool,

    /// Credits left (defaults to the session's balance)
    #[arg(long, value_name = "N")]
    pub credits: Option<u32>,

    /// Onboarding status (missing, incomplete, complete)
    #[arg(long, value_name = "STATUS", value_parser = parse_onboarding)]
    pub onboarding: Option<OnboardingStatus>,
}

impl UserArgs {
    /// Build the access context, using `session_credits` when `--credits` is absent.
    #[must_use]
    pub fn context(&self, session_credits: u32) -> AccessContext {
        if self.anonymous {
            return AccessContext::anonymous();
        }
        let role = self.role.as_deref().and_then(Role::from_arg);
        let context = AccessContext::authenticated(role, self.credits.unwrap_or(session_credits));
        match self.onboarding {
            Some(status) => context.with_onboarding(status),
            None => context,
        }
    }
}

fn parse_onboarding(s: &str) -> Result<OnboardingStatus, String> {
    OnboardingStatus::from_arg(s)
        .ok_or_else(|| format!("invalid onboarding status '{s}' (missing, incomplete, complete)"))
}

/// Task subcommands.
#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    /// Show how a request splits into subtasks
    Plan {
        #[arg(value_name = "REQUEST")]
        request: String,
    },

    /// Run a request through the built-in step executor
    Run {
        #[arg(value_name = "REQUEST")]
        request: String,

        /// Mark the task failed at this 1-based subtask
        #[arg(long, value_name = "N")]
        fail_at: Option<usize>,
    },
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_overrides_format() {
        let cli = Cli::parse_from(["kolgate", "--json", "clock"]);
        assert_eq!(cli.effective_format(), OutputFormat::Json);
    }

    #[test]
    fn global_session_after_subcommand() {
        let cli = Cli::parse_from(["kolgate", "send", "hi there", "--session", "alice"]);
        assert_eq!(cli.session.as_deref(), Some("alice"));
        assert!(matches!(cli.command, Some(Commands::Send(ref m)) if m.message == "hi there"));
    }

    #[test]
    fn credits_reset_amount_is_optional() {
        let cli = Cli::parse_from(["kolgate", "credits", "reset"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Credits(CreditsCommand::Reset { amount: None }))
        ));
        let cli = Cli::parse_from(["kolgate", "credits", "add-premium", "3"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Credits(CreditsCommand::AddPremium { amount: 3 }))
        ));
    }

    #[test]
    fn anonymous_conflicts_with_role() {
        let parsed = Cli::try_parse_from([
            "kolgate", "access", "redirect", "--anonymous", "--role", "brand",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn user_args_build_context() {
        let user = UserArgs {
            role: Some("KOL".to_string()),
            credits: None,
            onboarding: Some(OnboardingStatus::Incomplete),
            anonymous: false,
        };
        let context = user.context(2);
        assert_eq!(context.role, Some(Role::Kol));
        assert_eq!(context.credits_left, 2);
        assert_eq!(context.onboarding, OnboardingStatus::Incomplete);

        let unknown = UserArgs {
            role: Some("wizard".to_string()),
            ..UserArgs::default()
        };
        assert_eq!(unknown.context(0).role, None);
        assert!(unknown.context(0).is_authenticated);
    }

    #[test]
    fn invalid_onboarding_is_rejected() {
        let parsed = Cli::try_parse_from([
            "kolgate", "access", "redirect", "--onboarding", "halfway",
        ]);
        assert!(parsed.is_err());
    }
}
