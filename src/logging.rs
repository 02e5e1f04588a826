// Diagnostic logging for srctidy
//
// Log records go to stderr, a file, or both, as timestamped text lines or
// JSON objects. Console and file levels are independent. Per-file progress
// lines are console output written by the reporter, not log records.
//
// ```
// let config = LogConfig {
//     console_level: LevelFilter::Warn,
//     file_level: Some(LevelFilter::Debug),
//     format: LogFormat::Json,
//     destination: LogDestination::Both(PathBuf::from("srctidy.log")),
// };
// init_logger(config)?;
// log::debug!("walking {}", root.display());
// ```

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    Console,
    File(PathBuf),
    Both(PathBuf),
}

impl LogDestination {
    /// Console only, unless a log file is given
    pub fn for_log_file(log_file: Option<PathBuf>) -> Self {
        match log_file {
            Some(path) => LogDestination::Both(path),
            None => LogDestination::Console,
        }
    }

    fn file(&self) -> Option<&Path> {
        match self {
            LogDestination::Console => None,
            LogDestination::File(path) | LogDestination::Both(path) => Some(path),
        }
    }

    fn includes_console(&self) -> bool {
        !matches!(self, LogDestination::File(_))
    }
}

/// One JSON log line
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Highest level any destination accepts
    pub fn max_level(&self) -> LevelFilter {
        match self.file_level {
            Some(file_level) if self.destination.file().is_some() => file_level.max(self.console_level),
            _ => self.console_level,
        }
    }
}

/// `log::Log` implementation writing text or JSON lines
pub struct TidyLogger {
    config: LogConfig,
}

impl TidyLogger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    fn format_timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_record(&self, level: Level, target: &str, message: &str) -> String {
        match self.config.format {
            LogFormat::Text => self.format_text_message(level, message),
            LogFormat::Json => self.format_json_message(level, target, message).unwrap_or_else(|e| {
                eprintln!("JSON formatting error: {}. Falling back to text format.", e);
                self.format_text_message(level, message)
            }),
        }
    }

    fn format_text_message(&self, level: Level, message: &str) -> String {
        format!("{} [{}] {}", Self::format_timestamp(), level.as_str(), message)
    }

    fn format_json_message(&self, level: Level, target: &str, message: &str) -> Result<String> {
        let entry = JsonLogEntry {
            timestamp: Self::format_timestamp(),
            level: level.as_str().to_string(),
            target: target.to_string(),
            message: message.to_string(),
        };

        serde_json::to_string(&entry).context("Failed to serialize log entry to JSON")
    }

    fn should_log_to_console(&self, level: Level) -> bool {
        self.config.destination.includes_console() && level <= self.config.console_level
    }

    fn should_log_to_file(&self, level: Level) -> bool {
        match self.config.file_level {
            Some(file_level) => self.config.destination.file().is_some() && level <= file_level,
            None => false,
        }
    }

    fn write_to_console(&self, line: &str) -> Result<()> {
        writeln!(io::stderr(), "{}", line).context("Failed to write to console")
    }

    fn write_to_file(&self, line: &str, file_path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .with_context(|| format!("Failed to open log file: {}", file_path.display()))?;

        writeln!(file, "{}", line).context("Failed to write to log file")
    }
}

impl log::Log for TidyLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.should_log_to_console(metadata.level()) || self.should_log_to_file(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        let line = self.format_record(level, record.target(), &record.args().to_string());

        if self.should_log_to_console(level) {
            if let Err(e) = self.write_to_console(&line) {
                eprintln!("Console logging error: {}", e);
            }
        }

        if let (true, Some(path)) = (self.should_log_to_file(level), self.config.destination.file()) {
            if let Err(e) = self.write_to_file(&line, path) {
                eprintln!("File logging error: {}", e);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Install the global logger
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();

    log::set_boxed_logger(Box::new(TidyLogger::new(config))).context("Failed to set global logger")?;
    log::set_max_level(max_level);

    Ok(())
}

pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!(
            "Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off",
            level_str
        )),
    }
}

/// `--debug` wins over `--quiet`, both win over the configured level
pub fn console_level(debug: bool, quiet: bool, configured: Option<LevelFilter>) -> LevelFilter {
    if debug {
        LevelFilter::Trace
    } else if quiet {
        LevelFilter::Error
    } else {
        configured.unwrap_or(LevelFilter::Info)
    }
}
