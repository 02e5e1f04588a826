//! Plain text normalization: LF endings, UTF-8, no trailing whitespace

use std::path::Path;
use async_trait::async_trait;
use log::trace;
use crate::encoding::{DecodeResult, EncodingResolver};
use crate::error::TidyError;
use crate::enumerate::{ExtensionFilter, DEFAULT_IGNORED_EXTENSIONS};
use crate::normalize::Normalizer;
use super::{FormatOutcome, SourceFormatter};

/// Re-encodes every decodable text file in canonical form
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    resolver: EncodingResolver,
    normalizer: Normalizer,
    denied_extensions: Option<Vec<String>>,
}

impl TextFormatter {
    pub fn new(resolver: EncodingResolver, normalizer: Normalizer) -> Self {
        Self {
            resolver,
            normalizer,
            denied_extensions: None,
        }
    }

    /// Replace the default binary/IDE deny list
    pub fn with_denied_extensions(mut self, extensions: Vec<String>) -> Self {
        self.denied_extensions = Some(extensions);
        self
    }
}

#[async_trait]
impl SourceFormatter for TextFormatter {
    fn name(&self) -> &str {
        "normalize"
    }

    fn extensions(&self) -> ExtensionFilter {
        match &self.denied_extensions {
            Some(extensions) => ExtensionFilter::deny(extensions),
            None => ExtensionFilter::deny(DEFAULT_IGNORED_EXTENSIONS.iter().copied()),
        }
    }

    fn skips_empty(&self) -> bool {
        true
    }

    async fn format(&self, path: &Path, original: &[u8]) -> FormatOutcome {
        match self.resolver.resolve(original) {
            DecodeResult::Decoded { encoding, text } => {
                trace!("{} decoded as {}", path.display(), encoding);
                self.normalizer.diff(original, &text).into()
            }
            DecodeResult::Undecodable(_) => TidyError::decode(path).into(),
        }
    }
}
