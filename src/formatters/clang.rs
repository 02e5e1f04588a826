//! clang-format pass for C-family sources

use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use crate::encoding::EncodingResolver;
use crate::enumerate::ExtensionFilter;
use crate::error::TidyError;
use crate::normalize::Normalizer;
use crate::process::CommandLine;
use super::{FormatOutcome, SourceFormatter};

pub const DEFAULT_EXTENSIONS: &[&str] = &[".h", ".c", ".cc", ".cpp", ".c++", ".java"];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `clang-format -style=<style> <file>` and normalizes its output
#[derive(Debug, Clone)]
pub struct ClangFormat {
    program: String,
    style: String,
    timeout: Duration,
    extensions: Vec<String>,
    resolver: EncodingResolver,
    normalizer: Normalizer,
}

impl ClangFormat {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            style: "file".to_string(),
            timeout: DEFAULT_TIMEOUT,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            resolver: EncodingResolver::default(),
            normalizer: Normalizer::default(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn command_for(&self, path: &Path) -> CommandLine {
        CommandLine::new(&self.program)
            .arg(format!("-style={}", self.style))
            .arg(path)
    }
}

impl Default for ClangFormat {
    fn default() -> Self {
        Self::new("clang-format")
    }
}

#[async_trait]
impl SourceFormatter for ClangFormat {
    fn name(&self) -> &str {
        "clang-format"
    }

    fn extensions(&self) -> ExtensionFilter {
        ExtensionFilter::allow(&self.extensions)
    }

    async fn format(&self, path: &Path, original: &[u8]) -> FormatOutcome {
        let command = self.command_for(path);
        let output = match command.run(self.timeout).await {
            Ok(output) => output,
            Err(e) => return TidyError::tool(&self.program, format!("failed to run {}: {}", command.display(), e)).into(),
        };

        let stdout = match output.into_stdout(&self.program) {
            Ok(stdout) => stdout,
            Err(e) => return e.into(),
        };

        match self.resolver.resolve(&stdout).into_text() {
            Some(formatted) => self.normalizer.diff(original, &formatted).into(),
            None => TidyError::tool(&self.program, "output could not be decoded").into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_command_line() {
        let command = ClangFormat::default().command_for(Path::new("src/a.c"));
        assert_eq!(command.display(), "clang-format -style=file src/a.c");

        let command = ClangFormat::default().with_style("llvm").command_for(Path::new("a.h"));
        assert_eq!(command.display(), "clang-format -style=llvm a.h");
    }

    #[test]
    fn test_allow_list() {
        let filter = ClangFormat::default().extensions();
        for name in ["a.h", "a.C", "a.cc", "a.cpp", "a.c++", "A.java"] {
            assert!(filter.accepts(Path::new(name)), "{} should be accepted", name);
        }
        assert!(!filter.accepts(Path::new("a.py")));

        let filter = ClangFormat::default().with_extensions(vec!["m".to_string()]).extensions();
        assert!(filter.accepts(Path::new("a.m")));
        assert!(!filter.accepts(Path::new("a.c")));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_error() {
        let formatter = ClangFormat::new("srctidy-no-such-clang-format");
        let outcome = formatter.format(Path::new("a.c"), b"int a;\n").await;
        assert!(matches!(outcome, FormatOutcome::ToolError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_is_normalized_and_compared() {
        use std::os::unix::fs::PermissionsExt;

        // Stand-in formatter: prints the target followed by blank lines
        let temp_dir = tempfile::TempDir::new().unwrap();
        let script = temp_dir.path().join("fake-clang-format");
        fs::write(&script, "#!/bin/sh\ncat \"$2\"\nprintf '\\n\\n'\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let source = temp_dir.path().join("a.c");
        fs::write(&source, b"int a;   \r\n").unwrap();

        let formatter = ClangFormat::new(script.to_string_lossy());
        let outcome = formatter.format(&source, &fs::read(&source).unwrap()).await;
        assert_eq!(outcome, FormatOutcome::Changed(b"int a;\n".to_vec()));

        fs::write(&source, b"int a;\n").unwrap();
        let outcome = formatter.format(&source, b"int a;\n").await;
        assert_eq!(outcome, FormatOutcome::Unchanged);
    }
}
