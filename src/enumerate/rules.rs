//! Ignore rules for file enumeration

use std::collections::HashSet;
use std::path::Path;

/// Directory names skipped by every default rule set
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "logs",
    // Visual Studio project migration files
    "backup",
    "bin",
    "obj",
    ".vs",
    "debug",
    "release",
    ".ipynb_checkpoints",
    "__pycache__",
];

/// Extensions never treated as text by the plain normalizer
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &[
    ".bomb", ".map", ".xls", ".dll", ".jpg", ".gif", ".png", ".suo", ".exe", ".pdb", ".ilk", ".i64",
    ".idb",
];

/// Lowercase an extension and give it a leading dot
fn canonical_extension(extension: &str) -> String {
    let lowered = extension.trim().to_lowercase();
    if lowered.is_empty() || lowered.starts_with('.') {
        lowered
    } else {
        format!(".{}", lowered)
    }
}

/// Lowercased extension of `path` including the dot, empty when absent
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Which extensions are eligible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionFilter {
    /// Everything except these
    Deny(HashSet<String>),
    /// Only these
    Allow(HashSet<String>),
}

impl ExtensionFilter {
    pub fn deny<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Deny(extensions.into_iter().map(|e| canonical_extension(e.as_ref())).collect())
    }

    pub fn allow<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Allow(extensions.into_iter().map(|e| canonical_extension(e.as_ref())).collect())
    }

    pub fn accepts(&self, path: &Path) -> bool {
        let extension = extension_of(path);
        match self {
            ExtensionFilter::Deny(denied) => !denied.contains(&extension),
            ExtensionFilter::Allow(allowed) => allowed.contains(&extension),
        }
    }
}

/// Directory and extension exclusions, matched case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    ignored_dirs: HashSet<String>,
    extensions: ExtensionFilter,
}

impl IgnoreRules {
    pub fn new<I, S>(ignored_dirs: I, extensions: ExtensionFilter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ignored_dirs: ignored_dirs.into_iter().map(|d| d.as_ref().to_lowercase()).collect(),
            extensions,
        }
    }

    /// Default directory exclusions with the given extension filter
    pub fn with_default_dirs(extensions: ExtensionFilter) -> Self {
        Self::new(DEFAULT_IGNORED_DIRS.iter().copied(), extensions)
    }

    pub fn is_ignored_dir_name(&self, name: &str) -> bool {
        self.ignored_dirs.contains(&name.to_lowercase())
    }

    /// Any component of a relative path names an ignored directory
    pub fn has_ignored_component(&self, relative: &Path) -> bool {
        relative
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .any(|component| self.is_ignored_dir_name(&component.as_os_str().to_string_lossy()))
    }

    pub fn accepts_file(&self, path: &Path) -> bool {
        self.extensions.accepts(path)
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::with_default_dirs(ExtensionFilter::deny(DEFAULT_IGNORED_EXTENSIONS.iter().copied()))
    }
}
