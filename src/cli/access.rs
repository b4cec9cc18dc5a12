//! Access command implementation.

use crate::cli::CommandContext;
use crate::cli::args::{AccessCommand, UserArgs};
use crate::core::access::AccessContext;
use crate::core::models::{AccessReport, RedirectReport};
use crate::error::{KolgateError, Result};
use crate::render::human;

/// Evaluate `feature` for a user.
#[must_use]
pub fn check(context: AccessContext, feature: &str) -> AccessReport {
    AccessReport {
        feature: feature.to_string(),
        allowed: context.can_access_feature(feature),
        context,
        accessible_features: context.accessible_features(),
    }
}

/// Where a user should be sent.
#[must_use]
pub fn redirect(context: AccessContext) -> RedirectReport {
    let redirect = context.redirect();
    RedirectReport {
        path: redirect.path(),
        redirect,
        context,
    }
}

/// Credits left for the current session, after any pending daily reset.
/// Nothing is written.
fn session_credits(ctx: &CommandContext) -> Result<u32> {
    let mut credits = ctx
        .store()
        .open(&ctx.config.session, ctx.config.policy, ctx.now)?;
    credits.refresh(ctx.now);
    Ok(credits.credits_left())
}

fn user_context(user: &UserArgs, ctx: &CommandContext) -> Result<AccessContext> {
    let session_credits = if user.anonymous || user.credits.is_some() {
        0
    } else {
        session_credits(ctx)?
    };
    Ok(user.context(session_credits))
}

/// Execute an access subcommand.
///
/// # Errors
///
/// `access check` returns `AccessDenied` after printing the report when the
/// feature is denied. Both subcommands fail if session state is unreadable.
pub fn execute(command: &AccessCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        AccessCommand::Check { feature, user } => {
            let report = check(user_context(user, ctx)?, feature);
            tracing::debug!(feature = %feature, allowed = report.allowed, "Access checked");
            ctx.emit("access.check", &report, human::render_access)?;
            if report.allowed {
                Ok(())
            } else {
                Err(KolgateError::AccessDenied {
                    feature: feature.clone(),
                })
            }
        }
        AccessCommand::Redirect { user } => {
            let report = redirect(user_context(user, ctx)?);
            ctx.emit("access.redirect", &report, human::render_redirect)
        }
    }
}
