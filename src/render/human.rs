//! Human-readable output using `colored`.
//!
//! Every renderer returns a `String` ending in a newline; callers decide
//! where it is printed.

use std::fmt::Write as _;

use colored::Colorize;

use crate::core::classifier::{PatternMatch, QueryClass};
use crate::core::credits::{CreditBalance, CreditState};
use crate::core::models::{
    AccessReport, ClassifyReport, ClockReport, ConfigReport, CreditsReport, RedirectReport,
    SendReport, TaskPlan, TaskRunReport,
};
use crate::core::tasks::{TaskChange, TaskStatus, TaskUpdate};

/// Applies colors only when enabled.
#[derive(Debug, Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    const fn new(no_color: bool) -> Self {
        Self { color: !no_color }
    }

    fn ok(self, text: &str) -> String {
        if self.color { text.green().to_string() } else { text.to_string() }
    }

    fn bad(self, text: &str) -> String {
        if self.color { text.red().to_string() } else { text.to_string() }
    }

    fn warn(self, text: &str) -> String {
        if self.color { text.yellow().to_string() } else { text.to_string() }
    }

    fn dim(self, text: &str) -> String {
        if self.color { text.dimmed().to_string() } else { text.to_string() }
    }

    fn bold(self, text: &str) -> String {
        if self.color { text.bold().to_string() } else { text.to_string() }
    }

    fn verdict(self, allowed: bool) -> String {
        if allowed { self.ok("allowed") } else { self.bad("denied") }
    }

    fn class(self, class: QueryClass) -> String {
        match class {
            QueryClass::Specific => self.warn("specific"),
            QueryClass::General => self.ok("general"),
        }
    }

    fn status(self, status: TaskStatus) -> String {
        let text = status.as_str();
        match status {
            TaskStatus::Pending => self.dim(text),
            TaskStatus::InProgress => self.warn(text),
            TaskStatus::Completed => self.ok(text),
            TaskStatus::Failed => self.bad(text),
        }
    }
}

fn describe_match(matched: Option<&PatternMatch>) -> String {
    matched.map_or_else(
        || "no pattern matched".to_string(),
        |m| format!("{} \"{}\"", m.kind.display_name(), m.pattern),
    )
}

fn balance_lines(out: &mut String, state: &CreditState, per_credit: Option<u32>, p: Palette) {
    let free = state.free_credits.to_string();
    let free = if state.free_credits == 0 { p.bad(&free) } else { p.ok(&free) };
    let _ = writeln!(out, "  Free credits:     {free}");
    let _ = writeln!(out, "  Premium credits:  {}", state.premium_credits);
    match per_credit {
        Some(n) => {
            let _ = writeln!(
                out,
                "  General counter:  {}/{n}",
                state.general_question_counter
            );
        }
        None => {
            let _ = writeln!(out, "  General counter:  {}", state.general_question_counter);
        }
    }
    let _ = writeln!(
        out,
        "  Last reset:       {}",
        state.last_reset.format("%Y-%m-%d %H:%M UTC")
    );
}

/// Render `kolgate classify`.
#[must_use]
pub fn render_classify(report: &ClassifyReport, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({})",
        p.class(report.classification.class),
        describe_match(report.classification.matched.as_ref())
    );
    let _ = writeln!(out, "{}", p.dim(&format!("patterns: {}", report.patterns_version)));
    out
}

/// Render `kolgate send`.
#[must_use]
pub fn render_send(report: &SendReport, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let outcome = &report.outcome;
    let mut out = String::new();

    if outcome.was_reset {
        let _ = writeln!(out, "{}", p.dim("Daily credits restored."));
    }
    let _ = writeln!(
        out,
        "{} {} message ({})",
        p.bold(&p.verdict(outcome.allowed)),
        p.class(outcome.class),
        describe_match(outcome.matched.as_ref())
    );
    match outcome.charged {
        Some(CreditBalance::Free) => {
            let _ = writeln!(out, "  Charged:          1 free credit");
        }
        Some(CreditBalance::Premium) => {
            let _ = writeln!(out, "  Charged:          1 premium credit");
        }
        None if outcome.allowed => {
            let _ = writeln!(out, "  Charged:          nothing");
        }
        None => {
            let _ = writeln!(
                out,
                "  {}",
                p.bad(&format!("Out of credits. Resets in {}.", outcome.resets_in))
            );
        }
    }
    balance_lines(&mut out, &outcome.state, None, p);
    let _ = writeln!(out, "  Session:          {}", report.session);
    out
}

/// Render the `kolgate credits` subcommands.
#[must_use]
pub fn render_credits(report: &CreditsReport, per_credit: u32, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.bold(&format!("Credits for session {}", report.session)));
    if report.was_reset {
        let _ = writeln!(out, "  {}", p.dim("Daily credits restored."));
    }
    balance_lines(&mut out, &report.state, Some(per_credit), p);
    let _ = writeln!(out, "  Credits left:     {}", report.credits_left);
    let _ = writeln!(
        out,
        "  Next reset:       in {} ({})",
        report.resets_in,
        report.next_reset_at.format("%Y-%m-%d %H:%M UTC")
    );
    out
}

/// Render `kolgate clock`.
#[must_use]
pub fn render_clock(report: &ClockReport, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let mut out = String::new();
    let _ = writeln!(out, "Resets in {}", p.bold(&report.resets_in.to_string()));
    let _ = writeln!(
        out,
        "  Next reset:       {}",
        report.next_reset_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        out,
        "  Reset hour:       {:02}:00 (UTC{:+}m, {})",
        report.reset_hour,
        report.utc_offset_minutes,
        report.comparison.as_str()
    );
    match (report.last_reset, report.should_reset) {
        (Some(last), Some(stale)) => {
            let state = if stale { p.warn("stale, will reset") } else { p.ok("current") };
            let _ = writeln!(
                out,
                "  Session {}:  last reset {} ({state})",
                report.session,
                last.format("%Y-%m-%d %H:%M UTC")
            );
        }
        _ => {
            let _ = writeln!(
                out,
                "  Session {}:  {}",
                report.session,
                p.dim("no saved state")
            );
        }
    }
    out
}

/// Render `kolgate access check`.
#[must_use]
pub fn render_access(report: &AccessReport, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", report.feature, p.bold(&p.verdict(report.allowed)));
    let features: Vec<&str> = report
        .accessible_features
        .iter()
        .map(|f| f.as_str())
        .collect();
    let listed = if features.is_empty() {
        p.dim("none")
    } else {
        features.join(", ")
    };
    let _ = writeln!(out, "  Accessible:       {listed}");
    let _ = writeln!(out, "  Role:             {}", role_text(report.context.role, p));
    let _ = writeln!(out, "  Credits left:     {}", report.context.credits_left);
    out
}

/// Render `kolgate access redirect`.
#[must_use]
pub fn render_redirect(report: &RedirectReport, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.bold(&report.path));
    let signed_in = if report.context.is_authenticated { "yes" } else { "no" };
    let _ = writeln!(out, "  Signed in:        {signed_in}");
    let _ = writeln!(out, "  Role:             {}", role_text(report.context.role, p));
    let _ = writeln!(
        out,
        "  Onboarding:       {}",
        report.context.onboarding.as_str()
    );
    out
}

fn role_text(role: Option<crate::core::access::Role>, p: Palette) -> String {
    role.map_or_else(|| p.dim("none"), |r| r.to_string())
}

/// Render `kolgate tasks plan`.
#[must_use]
pub fn render_plan(plan: &TaskPlan, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.bold(&format!("{} subtask(s)", plan.subtasks.len())));
    for (i, subtask) in plan.subtasks.iter().enumerate() {
        let _ = writeln!(out, "  {}. {subtask}", i + 1);
    }
    out
}

/// Render one task notification as a single line.
#[must_use]
pub fn render_task_update(update: &TaskUpdate, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let short_id: String = update.task.id.chars().take(8).collect();
    let detail = match &update.change {
        TaskChange::Created => format!("created ({} subtasks)", update.task.subtasks.len()),
        TaskChange::Status { from, to } => format!("{} -> {}", from.as_str(), p.status(*to)),
        TaskChange::Subtask { index, status } => {
            let description = update
                .task
                .subtasks
                .get(*index)
                .map_or("", |s| s.description.as_str());
            format!("subtask {} {} ({description})", index + 1, p.status(*status))
        }
        TaskChange::Removed => "removed".to_string(),
    };
    format!("{} {detail}\n", p.dim(&format!("[{short_id}]")))
}

/// Render the summary after `kolgate tasks run`.
#[must_use]
pub fn render_task_run(report: &TaskRunReport, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let task = &report.task;
    let mut out = String::new();
    let _ = writeln!(out, "Task {} {}", task.id, p.bold(&p.status(task.status)));
    for (i, subtask) in task.subtasks.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. [{}] {}",
            i + 1,
            p.status(subtask.status),
            subtask.description
        );
    }
    if let Some(result) = &task.result {
        let _ = writeln!(out, "  Result: {result}");
    }
    if let Some(error) = &task.error {
        let _ = writeln!(out, "  {}", p.bad(&format!("Error: {error}")));
    }
    out
}

/// Render `kolgate config`.
#[must_use]
pub fn render_config(report: &ConfigReport, no_color: bool) -> String {
    let p = Palette::new(no_color);
    let mut out = String::new();
    let exists = if report.config_exists { "" } else { " (not found, using defaults)" };
    let _ = writeln!(out, "Config file: {}{}", report.config_path.display(), p.dim(exists));
    let _ = writeln!(out, "Sessions:    {}", report.sessions_dir.display());
    if !report.sessions.is_empty() {
        let _ = writeln!(out, "             {}", report.sessions.join(", "));
    }
    let _ = writeln!(out);
    let width = report.entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "  {:width$}  {}  {}",
            entry.key,
            entry.value,
            p.dim(&format!("[{}]", entry.source))
        );
    }
    out
}
