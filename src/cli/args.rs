use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use anyhow::Result;
use std::path::{Path, PathBuf};
use log::debug;

use super::enhanced_parser::parse_comma_separated;
use crate::config::parse_timeout;
use crate::enumerate::{StrategyPreference, VcsBackend};

/// Source tree normalizer and formatter driver
#[derive(Parser, Debug)]
#[command(name = "srctidy")]
#[command(about = "Normalize line endings, encodings and whitespace, and drive clang-format, google-java-format and notebook canonicalization over a source tree")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enumerate files through version control even without a .git directory at the root
    #[arg(long, global = true)]
    pub git: bool,

    /// Walk the filesystem even when the root is a git working tree
    #[arg(long = "no-git", global = true)]
    pub no_git: bool,

    /// Write changes back to disk (default: only report)
    #[arg(short, long, global = true)]
    pub run: bool,

    /// Also report unchanged and skipped files
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// External tool timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<String>,

    /// Directory names to skip (replaces the configured list) - supports comma-separated values
    #[arg(long = "ignore-dir", value_name = "NAME", action = ArgAction::Append, global = true)]
    pub ignore_dir: Vec<String>,

    /// Tracked file listing backend: cli or libgit2
    #[arg(long = "vcs-backend", value_name = "BACKEND", global = true)]
    pub vcs_backend: Option<String>,

    /// Quiet output (error level logging only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Log file path for file output
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Configuration section consulted before all others
    #[arg(long, value_name = "SECTION", global = true)]
    pub config_name: Option<String>,

    /// Force coloured output even when not writing to a terminal
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// LF line endings, UTF-8 and no trailing whitespace for every text file
    Normalize(TargetArgs),
    /// Run clang-format on C-family sources
    ClangFormat(ClangFormatArgs),
    /// Run google-java-format on Java sources
    JavaFormat(JavaFormatArgs),
    /// Canonicalize Jupyter notebooks
    Notebook(TargetArgs),
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Default)]
pub struct TargetArgs {
    /// Directory or single file to process
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Default)]
pub struct ClangFormatArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Value passed as -style=
    #[arg(long, value_name = "STYLE")]
    pub style: Option<String>,

    /// clang-format executable
    #[arg(long, value_name = "PROGRAM")]
    pub program: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Default)]
pub struct JavaFormatArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// google-java-format jar
    #[arg(long, value_name = "JAR")]
    pub jar: Option<PathBuf>,

    /// java executable
    #[arg(long, value_name = "PROGRAM")]
    pub java: Option<String>,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Normalize(_) => "normalize",
            Command::ClangFormat(_) => "clang-format",
            Command::JavaFormat(_) => "java-format",
            Command::Notebook(_) => "notebook",
        }
    }

    pub fn target(&self) -> &Path {
        match self {
            Command::Normalize(target) | Command::Notebook(target) => &target.path,
            Command::ClangFormat(args) => &args.target.path,
            Command::JavaFormat(args) => &args.target.path,
        }
    }
}

impl Args {
    /// Split comma-separated values in repeatable flags
    pub fn apply_enhanced_parsing(mut self) -> Self {
        self.ignore_dir = parse_comma_separated(self.ignore_dir);
        self
    }

    pub fn strategy_preference(&self) -> StrategyPreference {
        if self.git {
            StrategyPreference::ForceTracked
        } else if self.no_git {
            StrategyPreference::ForceWalk
        } else {
            StrategyPreference::Auto
        }
    }
}

pub fn parse_args() -> Args {
    let args = Args::parse().apply_enhanced_parsing();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Reject contradictory or malformed flag combinations
pub fn validate_args(args: &Args) -> Result<()> {
    if args.git && args.no_git {
        return Err(anyhow::anyhow!("Conflicting enumeration flags: only one of --git or --no-git may be specified"));
    }

    if args.quiet && args.debug {
        return Err(anyhow::anyhow!("Conflicting log level flags: only one of --quiet or --debug may be specified"));
    }

    if args.color && args.no_color {
        return Err(anyhow::anyhow!("Conflicting colour flags: only one of --color or --no-color may be specified"));
    }

    if let Some(format) = &args.log_format {
        match format.to_lowercase().as_str() {
            "text" | "json" => {}
            _ => return Err(anyhow::anyhow!("Invalid log format '{}'. Valid options: text, json", format)),
        }
    }

    if let Some(level) = &args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace",
                    level
                ))
            }
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!("--log-file-level requires --log-file to be specified"));
    }

    if let Some(timeout) = &args.timeout {
        parse_timeout(timeout).map_err(|e| anyhow::anyhow!("Invalid --timeout '{}': {}", timeout, e))?;
    }

    if let Some(backend) = &args.vcs_backend {
        backend.parse::<VcsBackend>().map_err(anyhow::Error::msg)?;
    }

    Ok(())
}
