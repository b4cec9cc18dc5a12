//! Send command implementation.

use chrono::{DateTime, Utc};

use crate::cli::CommandContext;
use crate::cli::args::MessageArgs;
use crate::core::classifier::QueryClassifier;
use crate::core::credits::CreditPolicy;
use crate::core::models::SendReport;
use crate::error::{KolgateError, Result};
use crate::render::human;
use crate::storage::CreditStateStore;

/// Charge `message` against a session and persist the result.
///
/// The state is saved even when the message is denied, so a daily reset
/// applied on the way is not lost.
///
/// # Errors
///
/// Returns an error if the session state cannot be loaded or saved.
pub fn send(
    store: &CreditStateStore,
    session: &str,
    policy: CreditPolicy,
    classifier: &QueryClassifier,
    message: &str,
    now: DateTime<Utc>,
) -> Result<SendReport> {
    let mut credits = store.open(session, policy, now)?;
    let outcome = credits.process_message(classifier, message, now);
    store.save(session, credits.state())?;

    if outcome.allowed {
        tracing::info!(
            session,
            class = outcome.class.as_str(),
            charged = ?outcome.charged,
            left = outcome.state.credits_left(),
            "Message allowed"
        );
    } else {
        tracing::info!(session, resets_in = %outcome.resets_in, "Message denied, no credits left");
    }

    Ok(SendReport {
        session: session.to_string(),
        message: message.to_string(),
        outcome,
    })
}

/// Execute the send command.
///
/// # Errors
///
/// Returns `QuotaExhausted` after printing the report when the message is
/// denied, or any storage/config error.
pub fn execute(args: &MessageArgs, ctx: &CommandContext) -> Result<()> {
    let classifier = ctx.config.classifier()?;
    let report = send(
        &ctx.store(),
        &ctx.config.session,
        ctx.config.policy,
        &classifier,
        &args.message,
        ctx.now,
    )?;
    ctx.emit("send", &report, human::render_send)?;

    if report.outcome.allowed {
        Ok(())
    } else {
        Err(KolgateError::QuotaExhausted {
            resets_in: report.outcome.resets_in.to_string(),
        })
    }
}
