mod commands;
mod config;
mod context;
mod diagnostics;
mod error;
mod grammar;
mod kv;
mod logging;
mod modifiers;
mod output;
mod processor;
mod resolver;
mod secrets;
mod traits;

use clap::Parser;
use commands::ReplaceCommand;
use context::Context;
use diagnostics::DiagnosticLog;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;

/// Exit code for any fatal replacement error
const FAILURE: u8 = 1;

#[derive(Parser)]
#[command(name = "inline-replace")]
#[command(
    about = "Resolve ${ secret:path@key } and ${ ref:KEY } placeholders read from stdin",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// YAML descriptor; its `kvFile` field names the key-value file (default: cluster.ini)
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let ctx = Context::new();
    let log = DiagnosticLog::for_current_program();

    if let Err(e) = log.prune_stale(&*ctx.fs, SystemTime::now()) {
        tracing::debug!(error = %e, "could not prune diagnostic log");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    match ReplaceCommand::execute(&ctx, &cli.config, stdin.lock(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ReplaceCommand::report_failure(&ctx, &log, &err);
            ExitCode::from(FAILURE)
        }
    }
}
