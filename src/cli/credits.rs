//! Credits command implementation.

use chrono::{DateTime, Utc};

use crate::cli::CommandContext;
use crate::cli::args::CreditsCommand;
use crate::core::credits::CreditPolicy;
use crate::core::models::CreditsReport;
use crate::error::Result;
use crate::render::human;
use crate::storage::CreditStateStore;

/// Apply a credits subcommand to a session.
///
/// A pending daily reset is applied first. `show` only writes when that
/// reset changed the state; every other action always persists.
///
/// # Errors
///
/// Returns an error if the session state cannot be loaded or saved.
pub fn apply(
    store: &CreditStateStore,
    session: &str,
    policy: CreditPolicy,
    command: CreditsCommand,
    now: DateTime<Utc>,
) -> Result<CreditsReport> {
    let mut credits = store.open(session, policy, now)?;
    let was_reset = credits.refresh(now);

    match command {
        CreditsCommand::Show => {}
        CreditsCommand::Reset { amount } => {
            credits.reset(amount.unwrap_or(policy.daily_free_credits), now);
        }
        CreditsCommand::Set { amount } => credits.set(amount),
        CreditsCommand::Add { amount } => credits.add(amount),
        CreditsCommand::AddPremium { amount } => credits.add_premium(amount),
    }

    if was_reset || command != CreditsCommand::Show {
        store.save(session, credits.state())?;
    }
    tracing::debug!(session, action = command.action(), was_reset, "Credits updated");

    Ok(CreditsReport {
        session: session.to_string(),
        action: command.action().to_string(),
        state: credits.state().clone(),
        credits_left: credits.credits_left(),
        was_reset,
        next_reset_at: policy.clock.next_reset_at(now),
        resets_in: credits.time_until_reset(now),
    })
}

/// Execute a credits subcommand.
///
/// # Errors
///
/// Returns an error if the session state cannot be loaded or saved.
pub fn execute(command: CreditsCommand, ctx: &CommandContext) -> Result<()> {
    let report = apply(
        &ctx.store(),
        &ctx.config.session,
        ctx.config.policy,
        command,
        ctx.now,
    )?;
    let per_credit = ctx.config.policy.general_questions_per_credit;
    ctx.emit(&format!("credits.{}", report.action), &report, |r, no_color| {
        human::render_credits(r, per_credit, no_color)
    })
}
