//! Error Types
//!
//! Error taxonomy shared by the enumerator, the process runner and the
//! formatter callers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for library operations
pub type TidyResult<T> = Result<T, TidyError>;

/// Errors surfaced while tidying a source tree
#[derive(Debug, Error)]
pub enum TidyError {
    /// No candidate encoding could decode the bytes
    #[error("Unable to decode {path} with any supported encoding")]
    Decode { path: PathBuf },

    /// External tool failed, timed out or produced unusable output
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// Filesystem access failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listing tracked files failed
    #[error("Version control listing failed in {root}: {message}")]
    Vcs { root: PathBuf, message: String },
}

impl TidyError {
    /// Create a tool error
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a version control error
    pub fn vcs(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Vcs {
            root: root.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a file no candidate encoding accepts
    pub fn decode(path: impl Into<PathBuf>) -> Self {
        Self::Decode { path: path.into() }
    }
}
