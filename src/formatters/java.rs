//! google-java-format pass

use std::path::{Path, PathBuf};
use std::time::Duration;
use async_trait::async_trait;
use crate::encoding::EncodingResolver;
use crate::enumerate::{ExtensionFilter, VcsFailurePolicy};
use crate::error::TidyError;
use crate::normalize::{LineEndingStyle, Normalizer};
use crate::process::CommandLine;
use super::{FormatOutcome, SourceFormatter};

/// Environment variable naming the formatter jar
pub const JAR_ENV_VAR: &str = "SRCTIDY_JAVA_FORMATTER_JAR";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const FORMATTER_FLAGS: [&str; 2] = ["--aosp", "--skip-reflowing-long-strings"];

/// Runs `java -jar <jar> --aosp --skip-reflowing-long-strings <file>`
#[derive(Debug, Clone)]
pub struct JavaFormat {
    program: String,
    jar: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
    resolver: EncodingResolver,
    normalizer: Normalizer,
}

impl JavaFormat {
    pub fn new(jar: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "java".to_string(),
            jar: jar.into(),
            working_dir: working_dir.into(),
            timeout: DEFAULT_TIMEOUT,
            resolver: EncodingResolver::default(),
            normalizer: Normalizer::new(LineEndingStyle::TranslateCarriageReturns),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The child runs in the root directory, so the target is made absolute
    pub fn command_for(&self, path: &Path) -> std::io::Result<CommandLine> {
        let target = path.canonicalize()?;
        Ok(CommandLine::new(&self.program)
            .arg("-jar")
            .arg(&self.jar)
            .args(FORMATTER_FLAGS)
            .arg(target)
            .current_dir(&self.working_dir))
    }
}

#[async_trait]
impl SourceFormatter for JavaFormat {
    fn name(&self) -> &str {
        "google-java-format"
    }

    fn extensions(&self) -> ExtensionFilter {
        ExtensionFilter::allow([".java"])
    }

    fn skips_empty(&self) -> bool {
        true
    }

    fn vcs_failure_policy(&self) -> VcsFailurePolicy {
        VcsFailurePolicy::FallBackToWalk
    }

    fn stops_on_tool_error(&self) -> bool {
        true
    }

    async fn format(&self, path: &Path, original: &[u8]) -> FormatOutcome {
        let command = match self.command_for(path) {
            Ok(command) => command,
            Err(e) => return TidyError::tool(self.name(), format!("cannot resolve {}: {}", path.display(), e)).into(),
        };

        let output = match command.run(self.timeout).await {
            Ok(output) => output,
            Err(e) => return TidyError::tool(self.name(), format!("failed to run {}: {}", command.display(), e)).into(),
        };

        let stdout = match output.into_stdout(self.name()) {
            Ok(stdout) => stdout,
            Err(e) => return e.into(),
        };

        match self.resolver.resolve(&stdout).into_text() {
            Some(formatted) => self.normalizer.diff(original, &formatted).into(),
            None => TidyError::tool(self.name(), "output could not be decoded").into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_command_line() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("Main.java");
        fs::write(&source, "class Main {}\n").unwrap();

        let formatter = JavaFormat::new("/opt/gjf.jar", temp_dir.path());
        let command = formatter.command_for(&source).unwrap();
        assert_eq!(
            command.display(),
            format!(
                "java -jar /opt/gjf.jar --aosp --skip-reflowing-long-strings {}",
                source.canonicalize().unwrap().display()
            )
        );
    }

    #[test]
    fn test_policies() {
        let formatter = JavaFormat::new("gjf.jar", ".");
        assert!(formatter.skips_empty());
        assert!(formatter.stops_on_tool_error());
        assert_eq!(formatter.vcs_failure_policy(), VcsFailurePolicy::FallBackToWalk);
        assert!(formatter.extensions().accepts(Path::new("A.JAVA")));
        assert!(!formatter.extensions().accepts(Path::new("a.c")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lone_carriage_returns_become_newlines() {
        use std::os::unix::fs::PermissionsExt;

        // Stand-in for java: prints the last argument
        let temp_dir = TempDir::new().unwrap();
        let script = temp_dir.path().join("fake-java");
        fs::write(&script, "#!/bin/sh\nfor last; do :; done\ncat \"$last\"\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let source = temp_dir.path().join("A.java");
        fs::write(&source, b"class A {\r}  \r\n").unwrap();

        let formatter = JavaFormat::new("gjf.jar", temp_dir.path()).with_program(script.to_string_lossy());
        let outcome = formatter.format(&source, &fs::read(&source).unwrap()).await;
        assert_eq!(outcome, FormatOutcome::Changed(b"class A {\n}\n".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_file_is_tool_error() {
        let formatter = JavaFormat::new("gjf.jar", ".");
        let outcome = formatter.format(Path::new("/nonexistent/A.java"), b"class A {}\n").await;
        assert!(matches!(outcome, FormatOutcome::ToolError(_)));
    }
}
