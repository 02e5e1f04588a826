//! File enumeration
//!
//! Produces the candidate files below a root, either by walking the
//! filesystem or by listing version-control tracked paths, with the same
//! directory and extension exclusions applied to both.

pub mod rules;
pub mod tracked;

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, warn};
use walkdir::WalkDir;
use crate::error::{TidyError, TidyResult};

pub use rules::{ExtensionFilter, IgnoreRules, DEFAULT_IGNORED_DIRS, DEFAULT_IGNORED_EXTENSIONS};
pub use tracked::{GitCommand, LibGit2Index, TrackedFileLister, VcsBackend};

/// Name of the directory marking a git working tree root
pub const VCS_METADATA_DIR: &str = ".git";

/// How candidate files are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FilesystemWalk,
    Tracked,
}

/// User preference feeding strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyPreference {
    /// Tracked listing when the root holds `.git`, walk otherwise
    #[default]
    Auto,
    ForceTracked,
    ForceWalk,
}

/// Pick a strategy for `root`
pub fn select_strategy(root: &Path, preference: StrategyPreference) -> Strategy {
    match preference {
        StrategyPreference::ForceTracked => Strategy::Tracked,
        StrategyPreference::ForceWalk => Strategy::FilesystemWalk,
        StrategyPreference::Auto => {
            if root.join(VCS_METADATA_DIR).exists() {
                Strategy::Tracked
            } else {
                Strategy::FilesystemWalk
            }
        }
    }
}

/// What to do when tracked listing fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VcsFailurePolicy {
    #[default]
    Fatal,
    /// Log the failure and walk the filesystem instead
    FallBackToWalk,
}

/// Enumerates candidate files under configured ignore rules
pub struct FileEnumerator {
    rules: IgnoreRules,
    lister: Box<dyn TrackedFileLister>,
    on_vcs_failure: VcsFailurePolicy,
}

impl FileEnumerator {
    pub fn new(rules: IgnoreRules, lister: Box<dyn TrackedFileLister>) -> Self {
        Self {
            rules,
            lister,
            on_vcs_failure: VcsFailurePolicy::Fatal,
        }
    }

    pub fn with_failure_policy(mut self, policy: VcsFailurePolicy) -> Self {
        self.on_vcs_failure = policy;
        self
    }

    pub fn rules(&self) -> &IgnoreRules {
        &self.rules
    }

    /// Candidate files below `root`, sorted by path.
    ///
    /// A root naming a regular file yields exactly that file.
    pub async fn enumerate(&self, root: &Path, strategy: Strategy) -> TidyResult<Vec<PathBuf>> {
        let metadata = fs::metadata(root).map_err(|e| TidyError::io(root, e))?;
        if metadata.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        match strategy {
            Strategy::FilesystemWalk => self.walk(root),
            Strategy::Tracked => match self.tracked(root).await {
                Ok(files) => Ok(files),
                Err(error @ TidyError::Vcs { .. }) if self.on_vcs_failure == VcsFailurePolicy::FallBackToWalk => {
                    warn!("Failed to use {} to list files: {}", self.lister.name(), error);
                    warn!("Falling back to walking {}", root.display());
                    self.walk(root)
                }
                Err(error) => Err(error),
            },
        }
    }

    /// Recursive walk skipping ignored directories without descending
    pub fn walk(&self, root: &Path) -> TidyResult<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && self.rules.is_ignored_dir_name(&entry.file_name().to_string_lossy()))
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                TidyError::io(path, e.into())
            })?;

            if entry.file_type().is_file() && self.rules.accepts_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        debug!("Walk of {} found {} candidate files", root.display(), files.len());
        Ok(files)
    }

    /// Tracked files that still exist as regular files and pass the rules
    pub async fn tracked(&self, root: &Path) -> TidyResult<Vec<PathBuf>> {
        let listed = self.lister.list_tracked(root).await?;

        let mut files = listed
            .into_iter()
            .filter(|relative| !self.rules.has_ignored_component(relative))
            .map(|relative| root.join(relative))
            // Tracked directories are uninitialized submodules; links are never followed
            .filter(|path| fs::symlink_metadata(path).map(|m| m.file_type().is_file()).unwrap_or(false))
            .filter(|path| self.rules.accepts_file(path))
            .collect::<Vec<_>>();
        files.sort();

        debug!("{} found {} candidate files in {}", self.lister.name(), files.len(), root.display());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedListing(Vec<&'static str>);

    #[async_trait]
    impl TrackedFileLister for FixedListing {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn list_tracked(&self, _root: &Path) -> TidyResult<Vec<PathBuf>> {
            Ok(self.0.iter().map(PathBuf::from).collect())
        }
    }

    struct FailingListing;

    #[async_trait]
    impl TrackedFileLister for FailingListing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn list_tracked(&self, root: &Path) -> TidyResult<Vec<PathBuf>> {
            Err(TidyError::vcs(root, "fatal: not a git repository"))
        }
    }

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for dir in [".git", "bin", "logs", "src", "src/Debug", "vendor"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("a.c"), "int a;\n").unwrap();
        fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(root.join("bin/tool.c"), "int t;\n").unwrap();
        fs::write(root.join("logs/run.log"), "log\n").unwrap();
        fs::write(root.join("src/b.h"), "int b;\n").unwrap();
        fs::write(root.join("src/Debug/gen.c"), "int g;\n").unwrap();
        temp_dir
    }

    #[test]
    fn test_walk_skips_ignored_dirs_and_extensions() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let enumerator = FileEnumerator::new(IgnoreRules::default(), Box::new(FixedListing(vec![])));

        let files = enumerator.walk(root).unwrap();
        assert_eq!(files, vec![root.join("a.c"), root.join("src/b.h")]);
    }

    #[test]
    fn test_walk_with_allow_list() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let rules = IgnoreRules::with_default_dirs(ExtensionFilter::allow([".h"]));
        let enumerator = FileEnumerator::new(rules, Box::new(FixedListing(vec![])));

        assert_eq!(enumerator.walk(root).unwrap(), vec![root.join("src/b.h")]);
    }

    #[tokio::test]
    async fn test_tracked_listing_filters() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let listing = FixedListing(vec!["src/b.h", "a.c", "gone.c", "vendor", "bin/tool.c", "logo.png"]);
        let enumerator = FileEnumerator::new(IgnoreRules::default(), Box::new(listing));

        let files = enumerator.enumerate(root, Strategy::Tracked).await.unwrap();
        assert_eq!(files, vec![root.join("a.c"), root.join("src/b.h")]);
    }

    #[tokio::test]
    async fn test_single_file_root() {
        let temp_dir = fixture();
        let file = temp_dir.path().join("logo.png");
        let enumerator = FileEnumerator::new(IgnoreRules::default(), Box::new(FailingListing));

        let files = enumerator.enumerate(&file, Strategy::Tracked).await.unwrap();
        assert_eq!(files, vec![file]);
    }

    #[tokio::test]
    async fn test_missing_root_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let enumerator = FileEnumerator::new(IgnoreRules::default(), Box::new(FailingListing));

        let result = enumerator.enumerate(&temp_dir.path().join("nope"), Strategy::FilesystemWalk).await;
        assert!(matches!(result, Err(TidyError::Io { .. })));
    }

    #[tokio::test]
    async fn test_vcs_failure_policies() {
        let temp_dir = fixture();
        let root = temp_dir.path();

        let fatal = FileEnumerator::new(IgnoreRules::default(), Box::new(FailingListing));
        assert!(matches!(fatal.enumerate(root, Strategy::Tracked).await, Err(TidyError::Vcs { .. })));

        let lenient = FileEnumerator::new(IgnoreRules::default(), Box::new(FailingListing))
            .with_failure_policy(VcsFailurePolicy::FallBackToWalk);
        let files = lenient.enumerate(root, Strategy::Tracked).await.unwrap();
        assert_eq!(files, vec![root.join("a.c"), root.join("src/b.h")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_skipped_by_both_strategies() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("real.c"), "int r;\n").unwrap();
        std::os::unix::fs::symlink("real.c", root.join("link.c")).unwrap();

        let listing = FixedListing(vec!["link.c", "real.c"]);
        let enumerator = FileEnumerator::new(IgnoreRules::default(), Box::new(listing));

        let expected = vec![root.join("real.c")];
        assert_eq!(enumerator.enumerate(root, Strategy::FilesystemWalk).await.unwrap(), expected);
        assert_eq!(enumerator.enumerate(root, Strategy::Tracked).await.unwrap(), expected);
    }

    #[test]
    fn test_strategy_selection() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        assert_eq!(select_strategy(root, StrategyPreference::Auto), Strategy::Tracked);
        assert_eq!(select_strategy(root, StrategyPreference::ForceWalk), Strategy::FilesystemWalk);

        let plain = TempDir::new().unwrap();
        assert_eq!(select_strategy(plain.path(), StrategyPreference::Auto), Strategy::FilesystemWalk);
        assert_eq!(select_strategy(plain.path(), StrategyPreference::ForceTracked), Strategy::Tracked);
    }
}
