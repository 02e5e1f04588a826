//! Batch execution: enumerate, format, optionally rewrite, report

use anyhow::{Context, Result};
use std::path::Path;
use log::{debug, info};
use crate::cli;
use crate::config::ConfigManager;
use crate::display::{Reporter, RunSummary};
use crate::enumerate::{select_strategy, FileEnumerator, StrategyPreference};
use crate::formatters::{format_file, FormatOutcome, SourceFormatter};
use crate::rewrite::replace_file;

/// Per-run switches taken from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub strategy: StrategyPreference,
    /// Write canonical content back to disk
    pub write: bool,
}

/// Process every candidate file below `root`, one at a time.
///
/// Decode and tool errors are reported and skipped. Read and write failures
/// abort the batch, as does the first tool error for formatters that stop on
/// one.
pub async fn run_batch(
    root: &Path,
    formatter: &dyn SourceFormatter,
    enumerator: &FileEnumerator,
    options: BatchOptions,
    reporter: &mut Reporter,
) -> Result<()> {
    let strategy = select_strategy(root, options.strategy);
    debug!("Enumerating {} with {:?}", root.display(), strategy);

    let files = enumerator
        .enumerate(root, strategy)
        .await
        .with_context(|| format!("Failed to list files under {}", root.display()))?;
    info!("{}: {} candidate files under {}", formatter.name(), files.len(), root.display());

    for path in files {
        let (outcome, size) = format_file(formatter, &path).await?;
        debug!("{} ({} bytes): {:?}", path.display(), size, OutcomeKind(&outcome));

        let rewritten = match &outcome {
            FormatOutcome::Changed(content) if options.write => {
                replace_file(&path, content)?;
                true
            }
            _ => false,
        };

        reporter.report(&path, &outcome, rewritten);

        if let FormatOutcome::ToolError(message) = &outcome {
            if formatter.stops_on_tool_error() {
                anyhow::bail!("Stopped at {}: {}", path.display(), message);
            }
        }
    }

    Ok(())
}

/// Outcome without the file content, for logs
struct OutcomeKind<'a>(&'a FormatOutcome);

impl std::fmt::Debug for OutcomeKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            FormatOutcome::Unchanged => write!(f, "unchanged"),
            FormatOutcome::Changed(content) => write!(f, "changed ({} bytes)", content.len()),
            FormatOutcome::SkippedEmpty => write!(f, "skipped empty"),
            FormatOutcome::DecodeError => write!(f, "decode error"),
            FormatOutcome::ToolError(message) => write!(f, "tool error: {}", message),
        }
    }
}

/// Run the selected subcommand end to end and print the summary line
pub async fn run(args: &cli::Args, config: &ConfigManager) -> Result<RunSummary> {
    let root = super::resolve_root(args.command.target())?;

    let formatter = super::create_formatter(args, config, &root)?;
    let enumerator = super::create_enumerator(args, config, formatter.as_ref())?;
    let colours = super::create_colour_manager(args, config)?;

    let options = BatchOptions {
        strategy: args.strategy_preference(),
        write: args.run,
    };

    let mut reporter = Reporter::new(colours, args.verbose);
    let result = run_batch(&root, formatter.as_ref(), &enumerator, options, &mut reporter).await;
    reporter.print_summary();

    result.map(|()| reporter.summary().clone())
}
