use crate::config::PluginConfig;
use crate::context::Context;
use crate::diagnostics::DiagnosticLog;
use crate::processor::LineProcessor;
use crate::resolver::ResolverContext;
use anyhow::{Context as AnyhowContext, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::SystemTime;

/// Resolve every placeholder of the input stream and write the result
pub struct ReplaceCommand;

impl ReplaceCommand {
    pub fn execute<R: BufRead, W: Write>(
        ctx: &Context,
        config_path: &Path,
        input: R,
        output: &mut W,
    ) -> Result<()> {
        let config = PluginConfig::from_file(&*ctx.fs, config_path)
            .with_context(|| format!("Failed to load configuration file {:?}", config_path))?;

        let kv_path = config.kv_file_path();
        tracing::debug!(kv_file = %kv_path.display(), "configuration loaded");

        let resolvers = ResolverContext::new(ctx, kv_path);
        let mut processor = LineProcessor::new(resolvers);
        let text = processor.process_all(input)?;

        output
            .write_all(&text)
            .and_then(|_| output.flush())
            .context("Failed to write output")?;

        Ok(())
    }

    /// Report a fatal error on stderr and in the diagnostic log
    pub fn report_failure(ctx: &Context, log: &DiagnosticLog, err: &anyhow::Error) {
        let message = format!("{:#}", err);
        ctx.output.error(&message);

        if let Err(log_err) = log.record(&*ctx.fs, &message, SystemTime::now()) {
            ctx.output
                .warning(&format!("Could not write diagnostic log: {:#}", log_err));
        } else {
            ctx.output
                .dimmed(&format!("Details written to {}", log.path().display()));
        }
    }
}
