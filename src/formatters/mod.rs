//! Formatter callers
//!
//! Each formatter turns a file's original bytes into a [`FormatOutcome`]:
//! the plain text normalizer, the clang-format and google-java-format
//! passes, and the notebook canonicalizer.

pub mod clang;
pub mod java;
pub mod notebook;
pub mod text;

use std::path::Path;
use async_trait::async_trait;
use crate::enumerate::{ExtensionFilter, VcsFailurePolicy};
use crate::error::{TidyError, TidyResult};
use crate::normalize::Diff;

pub use clang::ClangFormat;
pub use java::JavaFormat;
pub use notebook::NotebookFormatter;
pub use text::TextFormatter;

/// Result of formatting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Unchanged,
    /// Canonical bytes differing from the file content
    Changed(Vec<u8>),
    /// Zero-length file left alone
    SkippedEmpty,
    DecodeError,
    ToolError(String),
}

impl From<Diff> for FormatOutcome {
    fn from(diff: Diff) -> Self {
        match diff {
            Diff::Identical => FormatOutcome::Unchanged,
            Diff::Different(bytes) => FormatOutcome::Changed(bytes),
        }
    }
}

impl From<TidyError> for FormatOutcome {
    fn from(error: TidyError) -> Self {
        match error {
            TidyError::Decode { .. } => FormatOutcome::DecodeError,
            other => FormatOutcome::ToolError(other.to_string()),
        }
    }
}

/// A per-file transformation applied to every enumerated file
#[async_trait]
pub trait SourceFormatter: Send + Sync {
    /// Name used in messages
    fn name(&self) -> &str;

    /// Extensions this formatter handles by default
    fn extensions(&self) -> ExtensionFilter;

    /// Leave zero-length files untouched
    fn skips_empty(&self) -> bool {
        false
    }

    fn vcs_failure_policy(&self) -> VcsFailurePolicy {
        VcsFailurePolicy::Fatal
    }

    /// Abort the batch on the first tool error
    fn stops_on_tool_error(&self) -> bool {
        false
    }

    async fn format(&self, path: &Path, original: &[u8]) -> FormatOutcome;
}

/// Read `path` and run `formatter` over it.
///
/// Read failures are fatal; everything else is folded into the outcome.
pub async fn format_file(formatter: &dyn SourceFormatter, path: &Path) -> TidyResult<(FormatOutcome, usize)> {
    let original = tokio::fs::read(path).await.map_err(|e| TidyError::io(path, e))?;

    if original.is_empty() && formatter.skips_empty() {
        return Ok((FormatOutcome::SkippedEmpty, 0));
    }

    let outcome = formatter.format(path, &original).await;
    Ok((outcome, original.len()))
}
