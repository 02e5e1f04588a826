//! Application initialization: configuration, logging and the formatter pipeline

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use log::debug;
use crate::cli::{self, Command};
use crate::config::{self, parse_timeout};
use crate::display;
use crate::enumerate::{FileEnumerator, IgnoreRules, VcsBackend};
use crate::formatters::{self, ClangFormat, JavaFormat, NotebookFormatter, SourceFormatter, TextFormatter};
use crate::logging;

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = match &args.config_file {
        Some(config_file) => config::ConfigManager::load_from_file(config_file.clone())?,
        None => config::ConfigManager::load()?,
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

/// Command line flags override `[base]` settings
pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    let configured_level = config
        .get_log_level("base", "console-level")
        .context("Invalid console-level in configuration")?;
    let console_level = logging::console_level(args.debug, args.quiet, configured_level);

    let format = match args.log_format.as_deref().or_else(|| config.get_value("base", "log-format").map(String::as_str)) {
        Some(format) => logging::LogFormat::from_str(format).map_err(anyhow::Error::msg)?,
        None => logging::LogFormat::Text,
    };

    let log_file = args.log_file.clone().or_else(|| config.get_path("base", "log-file"));

    let file_level = match &args.log_file_level {
        Some(level) => Some(logging::parse_log_level(level)?),
        None => config
            .get_log_level("base", "file-log-level")
            .context("Invalid file-log-level in configuration")?,
    };

    // A log file without its own level follows the console
    let file_level = match (&log_file, file_level) {
        (Some(_), None) => Some(console_level),
        (_, level) => level,
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination: logging::LogDestination::for_log_file(log_file),
    })
}

pub fn create_colour_manager(args: &cli::Args, config: &config::ConfigManager) -> Result<display::ColourManager> {
    let colour_config = config.get_colour_config()?;
    Ok(display::ColourManager::from_color_args(args.no_color, args.color, colour_config))
}

/// `--timeout`, then the formatter's config section, then the built-in default
fn resolve_timeout(args: &cli::Args, config: &config::ConfigManager, section: &str, default: Duration) -> Result<Duration> {
    if let Some(timeout) = &args.timeout {
        return parse_timeout(timeout);
    }
    Ok(config.get_timeout(section, "timeout")?.unwrap_or(default))
}

/// Jar from the flag, the config file, or the environment
fn resolve_jar(flag: Option<&PathBuf>, config: &config::ConfigManager) -> Result<PathBuf> {
    flag.cloned()
        .or_else(|| config.get_path("java-format", "jar"))
        .or_else(|| std::env::var_os(formatters::java::JAR_ENV_VAR).map(PathBuf::from))
        .with_context(|| {
            format!(
                "No google-java-format jar configured: pass --jar, set [java-format] jar, or export {}",
                formatters::java::JAR_ENV_VAR
            )
        })
}

/// Formatter for the selected subcommand
pub fn create_formatter(args: &cli::Args, config: &config::ConfigManager, root: &Path) -> Result<Box<dyn SourceFormatter>> {
    let formatter: Box<dyn SourceFormatter> = match &args.command {
        Command::Normalize(_) => {
            let formatter = TextFormatter::default();
            match config.get_ignored_extensions() {
                Some(extensions) => Box::new(formatter.with_denied_extensions(extensions)),
                None => Box::new(formatter),
            }
        }
        Command::ClangFormat(clang) => {
            let program = clang
                .program
                .clone()
                .or_else(|| config.get_value("clang-format", "program").cloned())
                .unwrap_or_else(|| "clang-format".to_string());
            let mut formatter = ClangFormat::new(program).with_timeout(resolve_timeout(
                args,
                config,
                "clang-format",
                formatters::clang::DEFAULT_TIMEOUT,
            )?);

            if let Some(style) = clang.style.clone().or_else(|| config.get_value("clang-format", "style").cloned()) {
                formatter = formatter.with_style(style);
            }
            if let Some(extensions) = config.get_list("clang-format", "extensions") {
                formatter = formatter.with_extensions(extensions);
            }
            Box::new(formatter)
        }
        Command::JavaFormat(java) => {
            let jar = resolve_jar(java.jar.as_ref(), config)?;
            if !jar.is_file() {
                anyhow::bail!("google-java-format jar not found: {}", jar.display());
            }

            // The child runs in the root directory, or the file's parent for a single file
            let working_dir = if root.is_dir() {
                root.to_path_buf()
            } else {
                root.parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."))
            };

            let mut formatter = JavaFormat::new(jar, working_dir).with_timeout(resolve_timeout(
                args,
                config,
                "java-format",
                formatters::java::DEFAULT_TIMEOUT,
            )?);
            if let Some(program) = java.java.clone().or_else(|| config.get_value("java-format", "program").cloned()) {
                formatter = formatter.with_program(program);
            }
            Box::new(formatter)
        }
        Command::Notebook(_) => match config.get_value("notebook", "indent") {
            Some(indent) => Box::new(NotebookFormatter::new(indent.clone())),
            None => Box::new(NotebookFormatter::default()),
        },
    };

    debug!("Using formatter: {}", formatter.name());
    Ok(formatter)
}

/// Enumerator using the formatter's extension filter and VCS failure policy
pub fn create_enumerator(
    args: &cli::Args,
    config: &config::ConfigManager,
    formatter: &dyn SourceFormatter,
) -> Result<FileEnumerator> {
    let ignored_dirs = if args.ignore_dir.is_empty() {
        config.get_ignored_dirs()
    } else {
        args.ignore_dir.clone()
    };

    let backend = match &args.vcs_backend {
        Some(backend) => VcsBackend::from_str(backend).map_err(anyhow::Error::msg)?,
        None => config.get_vcs_backend()?,
    };
    debug!("Ignored directories: {:?}, vcs backend: {:?}", ignored_dirs, backend);

    let rules = IgnoreRules::new(ignored_dirs, formatter.extensions());
    Ok(FileEnumerator::new(rules, backend.lister()).with_failure_policy(formatter.vcs_failure_policy()))
}
