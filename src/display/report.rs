//! Per-file console lines and the end-of-run summary

use std::io::{self, Write};
use std::path::Path;
use log::debug;
use crate::formatters::FormatOutcome;
use super::colours::ColourManager;
use super::format::CompactFormat;

/// Counters accumulated over one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub rewritten: usize,
    pub skipped: usize,
    pub decode_errors: usize,
    pub tool_errors: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FormatOutcome, rewritten: bool) {
        self.files += 1;
        match outcome {
            FormatOutcome::Unchanged => self.unchanged += 1,
            FormatOutcome::Changed(_) => {
                self.changed += 1;
                if rewritten {
                    self.rewritten += 1;
                }
            }
            FormatOutcome::SkippedEmpty => self.skipped += 1,
            FormatOutcome::DecodeError => self.decode_errors += 1,
            FormatOutcome::ToolError(_) => self.tool_errors += 1,
        }
    }

    pub fn errors(&self) -> usize {
        self.decode_errors + self.tool_errors
    }
}

impl CompactFormat for RunSummary {
    fn to_compact_format(&self) -> String {
        format!(
            "Files: {} | Changed: {} | Rewritten: {} | Errors: {}",
            self.files,
            self.changed,
            self.rewritten,
            self.errors()
        )
    }
}

/// Writes one line per processed file to stdout
#[derive(Debug, Clone)]
pub struct Reporter {
    colours: ColourManager,
    verbose: bool,
    summary: RunSummary,
}

impl Reporter {
    pub fn new(colours: ColourManager, verbose: bool) -> Self {
        Self {
            colours,
            verbose,
            summary: RunSummary::default(),
        }
    }

    /// Console line for a file, or `None` when it is only shown in verbose mode
    pub fn render(&self, path: &Path, outcome: &FormatOutcome, rewritten: bool) -> Option<String> {
        let status = match outcome {
            FormatOutcome::Unchanged if self.verbose => self.colours.success("OK").to_string(),
            FormatOutcome::SkippedEmpty if self.verbose => self.colours.warning("SKIP_EMPTY").to_string(),
            FormatOutcome::Unchanged | FormatOutcome::SkippedEmpty => return None,
            FormatOutcome::Changed(_) if rewritten => {
                format!("{} -> {}", self.colours.error("x"), self.colours.success("OK"))
            }
            FormatOutcome::Changed(_) => self.colours.error("x").to_string(),
            FormatOutcome::DecodeError => {
                format!("- {}", self.colours.error("could not decode file"))
            }
            FormatOutcome::ToolError(message) => format!("- {}", self.colours.error(message)),
        };

        Some(format!("> {} {}", path.display(), status))
    }

    /// Record the outcome and print its line
    pub fn report(&mut self, path: &Path, outcome: &FormatOutcome, rewritten: bool) {
        self.report_to(&mut io::stdout().lock(), path, outcome, rewritten);
    }

    pub fn report_to(&mut self, out: &mut impl Write, path: &Path, outcome: &FormatOutcome, rewritten: bool) {
        self.summary.record(outcome, rewritten);

        if let Some(line) = self.render(path, outcome, rewritten) {
            write_line(out, &line);
        }
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn print_summary(&self) {
        self.print_summary_to(&mut io::stdout().lock());
    }

    pub fn print_summary_to(&self, out: &mut impl Write) {
        let line = self.summary.to_compact_format();
        let line = if self.summary.errors() > 0 {
            self.colours.warning(&line)
        } else {
            self.colours.highlight(&line)
        };
        write_line(out, &line.to_string());
    }
}

/// Console output is best effort; a closed pipe must not abort the batch
fn write_line(out: &mut impl Write, line: &str) {
    if let Err(e) = writeln!(out, "{}", line).and_then(|()| out.flush()) {
        debug!("Dropped console output: {}", e);
    }
}
