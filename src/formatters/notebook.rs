//! Jupyter notebook canonicalization
//!
//! Drops the interpreter version from the notebook metadata and rewrites the
//! JSON with tab indentation, keeping key order and non-ASCII text as is.

use std::path::Path;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use crate::encoding::EncodingResolver;
use crate::enumerate::ExtensionFilter;
use crate::error::{TidyError, TidyResult};
use crate::normalize::Diff;
use super::{FormatOutcome, SourceFormatter};

/// Canonicalizes `.ipynb` files
#[derive(Debug, Clone)]
pub struct NotebookFormatter {
    indent: String,
    resolver: EncodingResolver,
}

impl NotebookFormatter {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            resolver: EncodingResolver::default(),
        }
    }

    /// Canonical serialization of a notebook document
    pub fn canonicalize(&self, text: &str) -> TidyResult<Vec<u8>> {
        let mut notebook: Value = serde_json::from_str(text)
            .map_err(|e| TidyError::tool(self.name(), format!("invalid notebook JSON: {}", e)))?;

        if let Some(language_info) = notebook
            .pointer_mut("/metadata/language_info")
            .and_then(Value::as_object_mut)
        {
            language_info.shift_remove("version");
        }

        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        notebook
            .serialize(&mut serializer)
            .map_err(|e| TidyError::tool(self.name(), format!("failed to serialize notebook: {}", e)))?;

        if buffer.last() != Some(&b'\n') {
            buffer.push(b'\n');
        }
        Ok(buffer)
    }
}

impl Default for NotebookFormatter {
    fn default() -> Self {
        Self::new("\t")
    }
}

#[async_trait]
impl SourceFormatter for NotebookFormatter {
    fn name(&self) -> &str {
        "notebook"
    }

    fn extensions(&self) -> ExtensionFilter {
        ExtensionFilter::allow([".ipynb"])
    }

    fn skips_empty(&self) -> bool {
        true
    }

    async fn format(&self, path: &Path, original: &[u8]) -> FormatOutcome {
        let text = match self.resolver.resolve(original).into_text() {
            Some(text) => text,
            None => return TidyError::decode(path).into(),
        };

        match self.canonicalize(&text) {
            Ok(canonical) => Diff::between(original, canonical).into(),
            Err(e) => e.into(),
        }
    }
}
