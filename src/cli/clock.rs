//! Clock command implementation.

use chrono::{DateTime, Utc};

use crate::cli::CommandContext;
use crate::core::models::ClockReport;
use crate::core::reset_clock::ResetClock;
use crate::error::Result;
use crate::render::human;
use crate::storage::CreditStateStore;

/// Describe the reset schedule and whether `session` is due for a reset.
///
/// # Errors
///
/// Returns an error if saved state exists but cannot be read.
pub fn clock(
    store: &CreditStateStore,
    session: &str,
    clock: ResetClock,
    now: DateTime<Utc>,
) -> Result<ClockReport> {
    let last_reset = store.load(session)?.map(|state| state.last_reset);
    Ok(ClockReport {
        now,
        reset_hour: clock.reset_hour(),
        utc_offset_minutes: clock.utc_offset_minutes(),
        comparison: clock.comparison(),
        next_reset_at: clock.next_reset_at(now),
        resets_in: clock.time_until_reset(now),
        session: session.to_string(),
        last_reset,
        should_reset: last_reset.map(|last| clock.should_reset(last, now)),
    })
}

/// Execute the clock command.
///
/// # Errors
///
/// Returns an error if saved state exists but cannot be read.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let report = clock(
        &ctx.store(),
        &ctx.config.session,
        ctx.config.policy.clock,
        ctx.now,
    )?;
    ctx.emit("clock", &report, human::render_clock)
}
