//! Version-control tracked file listing

use std::path::{Path, PathBuf};
use std::time::Duration;
use async_trait::async_trait;
use git2::{Repository, RepositoryOpenFlags};
use log::debug;
use crate::encoding::EncodingResolver;
use crate::error::{TidyError, TidyResult};
use crate::process::CommandLine;

const CEILING_ENV_VAR: &str = "GIT_CEILING_DIRECTORIES";

/// Lists tracked paths below a directory, relative to that directory
#[async_trait]
pub trait TrackedFileLister: Send + Sync {
    /// Backend name for messages
    fn name(&self) -> &str;

    async fn list_tracked(&self, root: &Path) -> TidyResult<Vec<PathBuf>>;
}

/// Available listing backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VcsBackend {
    /// `git ls-files` subprocess
    #[default]
    Cli,
    /// In-process index read through libgit2
    LibGit2,
}

impl std::str::FromStr for VcsBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cli" | "git" => Ok(VcsBackend::Cli),
            "libgit2" | "git2" => Ok(VcsBackend::LibGit2),
            _ => Err(format!("Invalid vcs backend: {}. Valid options: cli, libgit2", s)),
        }
    }
}

impl VcsBackend {
    pub fn lister(&self) -> Box<dyn TrackedFileLister> {
        match self {
            VcsBackend::Cli => Box::new(GitCommand::default()),
            VcsBackend::LibGit2 => Box::new(LibGit2Index::default().with_ceiling_dirs(ceiling_dirs_from_env())),
        }
    }
}

/// Runs `git ls-files` in the root directory
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: String,
    timeout: Duration,
    resolver: EncodingResolver,
}

impl GitCommand {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            resolver: EncodingResolver::default(),
        }
    }
}

impl Default for GitCommand {
    fn default() -> Self {
        Self::new("git", Duration::from_secs(60))
    }
}

#[async_trait]
impl TrackedFileLister for GitCommand {
    fn name(&self) -> &str {
        "git ls-files"
    }

    async fn list_tracked(&self, root: &Path) -> TidyResult<Vec<PathBuf>> {
        let command = CommandLine::new(&self.program)
            .args(["-c", "core.quotepath=off", "ls-files"])
            .current_dir(root);

        let output = command
            .run(self.timeout)
            .await
            .map_err(|e| TidyError::vcs(root, format!("failed to run {}: {}", command.display(), e)))?;
        let stdout = output
            .into_stdout(&self.program)
            .map_err(|e| TidyError::vcs(root, e.to_string()))?;

        let listing = self
            .resolver
            .resolve(&stdout)
            .into_text()
            .ok_or_else(|| TidyError::vcs(root, "failed to decode the git output"))?;

        let paths = parse_listing(&listing);
        debug!("git ls-files listed {} paths in {}", paths.len(), root.display());
        Ok(paths)
    }
}

/// Split newline separated listing output, dropping empty lines.
///
/// Paths are kept verbatim apart from a trailing `\r`.
pub fn parse_listing(listing: &str) -> Vec<PathBuf> {
    listing
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Ceilings honoured by `git` itself, so both backends discover the same repository
pub fn ceiling_dirs_from_env() -> Vec<PathBuf> {
    std::env::var_os(CEILING_ENV_VAR)
        .map(|value| std::env::split_paths(&value).filter(|dir| !dir.as_os_str().is_empty()).collect())
        .unwrap_or_default()
}

/// Reads the repository index with libgit2
#[derive(Debug, Clone, Default)]
pub struct LibGit2Index {
    /// Directories repository discovery never climbs into
    ceiling_dirs: Vec<PathBuf>,
}

impl LibGit2Index {
    pub fn with_ceiling_dirs(mut self, ceiling_dirs: Vec<PathBuf>) -> Self {
        self.ceiling_dirs = ceiling_dirs;
        self
    }

    fn list_blocking(root: &Path, ceiling_dirs: &[PathBuf]) -> TidyResult<Vec<PathBuf>> {
        let repo = Repository::open_ext(root, RepositoryOpenFlags::empty(), ceiling_dirs)
            .map_err(|e| TidyError::vcs(root, e.message()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| TidyError::vcs(root, "bare repository has no working tree"))?;

        let workdir = workdir.canonicalize().map_err(|e| TidyError::io(workdir, e))?;
        let root_canonical = root.canonicalize().map_err(|e| TidyError::io(root, e))?;
        let prefix = root_canonical
            .strip_prefix(&workdir)
            .map_err(|_| TidyError::vcs(root, "directory is outside the repository working tree"))?
            .to_path_buf();

        let index = repo.index().map_err(|e| TidyError::vcs(root, e.message()))?;
        let paths = index
            .iter()
            .filter_map(|entry| {
                let path = PathBuf::from(String::from_utf8_lossy(&entry.path).into_owned());
                path.strip_prefix(&prefix).ok().map(Path::to_path_buf)
            })
            .collect::<Vec<_>>();

        debug!("libgit2 index listed {} paths in {}", paths.len(), root.display());
        Ok(paths)
    }
}

#[async_trait]
impl TrackedFileLister for LibGit2Index {
    fn name(&self) -> &str {
        "libgit2 index"
    }

    async fn list_tracked(&self, root: &Path) -> TidyResult<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let ceiling_dirs = self.ceiling_dirs.clone();
        tokio::task::spawn_blocking(move || Self::list_blocking(&root, &ceiling_dirs))
            .await
            .map_err(|e| TidyError::vcs(PathBuf::new(), e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_drops_empty_lines() {
        let paths = parse_listing("src/a.c\n\ninclude/a.h\r\n");
        assert_eq!(paths, vec![PathBuf::from("src/a.c"), PathBuf::from("include/a.h")]);
    }

    #[test]
    fn test_parse_listing_keeps_surrounding_spaces() {
        let paths = parse_listing(" lead.c\ntrail.c \r\n");
        assert_eq!(paths, vec![PathBuf::from(" lead.c"), PathBuf::from("trail.c ")]);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("cli".parse::<VcsBackend>().unwrap(), VcsBackend::Cli);
        assert_eq!("LibGit2".parse::<VcsBackend>().unwrap(), VcsBackend::LibGit2);
        assert!("svn".parse::<VcsBackend>().is_err());
        assert_eq!(VcsBackend::LibGit2.lister().name(), "libgit2 index");
    }

    #[tokio::test]
    async fn test_libgit2_outside_repository_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let ceiling = temp_dir.path().canonicalize().unwrap();
        let root = ceiling.join("plain");
        std::fs::create_dir(&root).unwrap();

        // Discovery stops at the ceiling, so an enclosing repository is never found
        let lister = LibGit2Index::default().with_ceiling_dirs(vec![ceiling.clone()]);
        let result = lister.list_tracked(&root).await;
        assert!(matches!(result, Err(TidyError::Vcs { .. })));

        // A repository just above the directory is found without a ceiling
        Repository::init(&ceiling).unwrap();
        let paths = LibGit2Index::default().list_tracked(&root).await.unwrap();
        assert!(paths.is_empty());
    }
}
