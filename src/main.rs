//! kolgate - credit quota and access control for KOL marketing
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use chrono::Utc;
use clap::Parser;
use std::process::ExitCode;

use kolgate::cli::{Cli, CommandContext};
use kolgate::core::logging::{self, LogSettings};
use kolgate::render::RenderOptions;
use kolgate::storage::{AppPaths, ResolvedConfig};
use kolgate::util::env::{should_use_color, stderr_is_tty, stdout_is_tty};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is resolved before logging so the file's log level applies;
    // a resolution error is reported once logging is up.
    let resolved = ResolvedConfig::resolve(&cli);
    let (format, pretty, no_color, verbose, config_level) = match &resolved {
        Ok(config) => (
            config.format,
            config.pretty,
            config.no_color,
            config.verbose,
            config.log_level.clone(),
        ),
        Err(_) => (cli.effective_format(), cli.pretty, cli.no_color, cli.verbose, None),
    };

    logging::init(&LogSettings::resolve(
        cli.log_level.as_deref(),
        cli.json_output,
        verbose,
        config_level.as_deref(),
    ));

    let result = match resolved {
        Ok(config) => {
            tracing::debug!(path = %config.config_path.display(), session = %config.session, "Configuration resolved");
            let options = RenderOptions::new(format, pretty, !should_use_color(no_color, stdout_is_tty()));
            run(cli, config, options).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = %e.error_code(), "{e}");
            let stderr_no_color = !should_use_color(no_color, stderr_is_tty());
            let error_output = kolgate::render::error::render_error(&e, format, stderr_no_color, pretty);
            eprintln!("{error_output}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli, config: ResolvedConfig, options: RenderOptions) -> kolgate::Result<()> {
    let Some(command) = cli.command else {
        print_quickstart();
        return Ok(());
    };

    let ctx = CommandContext::new(config, AppPaths::new(), options, Utc::now());
    kolgate::cli::dispatch(command, &ctx).await
}

fn print_quickstart() {
    println!(
        r#"kolgate - credit quota and access control for KOL marketing

USAGE:
    kolgate [OPTIONS] <COMMAND>

COMMANDS:
    classify   Classify a message as specific or general
    send       Charge a message against the session's credits
    credits    Show or adjust credits (show, reset, set, add, add-premium)
    clock      Countdown to the next daily reset
    access     Feature checks and redirects
    tasks      Plan or run compound tasks
    config     Show resolved settings

QUICK START:
    kolgate send "find me a fashion creator"
    kolgate credits show --session alice
    kolgate access check campaigns --role brand
    kolgate tasks run "find creators; draft brief; send offers"

ROBOT MODE (for AI agents):
    kolgate credits show --json   # JSON output

For more help: kolgate --help
"#
    );
    println!("kolgate {}", env!("CARGO_PKG_VERSION"));
}
