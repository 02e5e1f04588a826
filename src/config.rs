use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::cli::enhanced_parser::parse_comma_separated;
use crate::display::{ColourConfig, ColourTheme};
use crate::enumerate::{VcsBackend, DEFAULT_IGNORED_DIRS};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "SRCTIDY_CONFIG";

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    selected_section: Option<String>,
}

impl ConfigManager {
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            selected_section: None,
        }
    }

    /// Load the first configuration file found in the discovery order
    pub fn load() -> Result<Self> {
        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.is_file() {
                return Self::load_from_file(path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::from_config(Configuration::new()))
    }

    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            selected_section: None,
        })
    }

    /// Lookup order: selected section, requested section, `[base]`
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Section consulted first (--config-name)
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!("Invalid boolean value for {}.{}: {}", section, key, value)),
            },
            None => Ok(None),
        }
    }

    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Comma-separated string or TOML array
    pub fn get_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        self.get_value(section, key)
            .map(|value| parse_comma_separated(vec![value.clone()]))
    }

    /// Timeout in whole or fractional seconds
    pub fn get_timeout(&self, section: &str, key: &str) -> Result<Option<Duration>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(parse_timeout(value).with_context(|| {
                format!("Invalid timeout for {}.{}: {}", section, key, value)
            })?)),
            None => Ok(None),
        }
    }

    /// Colour settings from `[colours]`, `None` when the section is absent
    pub fn get_colour_config(&self) -> Result<Option<ColourConfig>> {
        if !self.config.contains_key("colours") {
            return Ok(None);
        }

        let mut colour_config = ColourConfig::default();
        if let Some(enabled) = self.get_bool("colours", "enabled")? {
            colour_config.set_enabled(enabled);
        }
        if let Some(theme) = self.get_value("colours", "theme") {
            let theme = theme.parse::<ColourTheme>().map_err(anyhow::Error::msg)?;
            colour_config.set_theme(theme);
        }
        Ok(Some(colour_config))
    }

    pub fn get_vcs_backend(&self) -> Result<VcsBackend> {
        match self.get_value("vcs", "backend") {
            Some(value) => value.parse::<VcsBackend>().map_err(anyhow::Error::msg),
            None => Ok(VcsBackend::default()),
        }
    }

    /// `[walk] ignored-dirs`, replacing the built-in list when present
    pub fn get_ignored_dirs(&self) -> Vec<String> {
        self.get_list("walk", "ignored-dirs")
            .unwrap_or_else(|| DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect())
    }

    pub fn get_ignored_extensions(&self) -> Option<Vec<String>> {
        self.get_list("walk", "ignored-extensions")
    }
}

/// Seconds as an integer or decimal, strictly positive
pub fn parse_timeout(value: &str) -> Result<Duration> {
    let seconds = value.trim().parse::<f64>()
        .with_context(|| format!("Not a number of seconds: {}", value))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(anyhow::anyhow!("Timeout must be a positive number of seconds: {}", value));
    }
    Ok(Duration::from_secs_f64(seconds))
}

/// Candidate configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("srctidy").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".srctidy.toml"));
    }

    paths.push(PathBuf::from("./.srctidy.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse().context("Failed to parse TOML content")?;

    let mut config = Configuration::new();
    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    Ok(config)
}

/// Nested tables become dotted section names (`[a.b]` -> `a.b`)
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) if subtable.values().any(|v| matches!(v, Value::Table(_))) => {
                flatten_toml_table(subtable, section_name, config);
            }
            Value::Table(subtable) => {
                config.entry(section_name).or_default().extend(
                    subtable
                        .iter()
                        .map(|(subkey, subvalue)| (subkey.clone(), toml_value_to_string(subvalue))),
                );
            }
            // Top-level keys outside any table
            _ => {
                config
                    .entry(if prefix.is_empty() { "base".to_string() } else { prefix.clone() })
                    .or_default()
                    .insert(key.clone(), toml_value_to_string(value));
            }
        }
    }
}

fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(toml_value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    fn manager(toml_content: &str) -> ConfigManager {
        ConfigManager::from_config(parse_toml_config(toml_content).unwrap())
    }

    #[test]
    fn test_toml_value_to_string_conversion() {
        assert_eq!(toml_value_to_string(&Value::String("file".to_string())), "file");
        assert_eq!(toml_value_to_string(&Value::Integer(5)), "5");
        assert_eq!(toml_value_to_string(&Value::Float(2.5)), "2.5");
        assert_eq!(toml_value_to_string(&Value::Boolean(false)), "false");

        let array = Value::Array(vec![Value::String(".git".to_string()), Value::String("target".to_string())]);
        assert_eq!(toml_value_to_string(&array), ".git,target");
    }

    #[test]
    fn test_parse_toml_config() {
        let config = parse_toml_config(
            r#"
[base]
console-level = "warn"

[clang-format]
style = "llvm"
timeout = 10

[profiles.ci]
log-format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config["base"]["console-level"], "warn");
        assert_eq!(config["clang-format"]["style"], "llvm");
        assert_eq!(config["clang-format"]["timeout"], "10");
        assert_eq!(config["profiles.ci"]["log-format"], "json");
    }

    #[test]
    fn test_top_level_keys_land_in_base() {
        let manager = manager("log-format = \"json\"\n");
        assert_eq!(manager.get_value("base", "log-format").unwrap(), "json");
    }

    #[test]
    fn test_value_lookup_falls_back_to_base() {
        let manager = manager(
            r#"
[base]
timeout = 30

[java-format]
jar = "/opt/gjf.jar"
"#,
        );

        assert_eq!(manager.get_value("java-format", "jar").unwrap(), "/opt/gjf.jar");
        assert_eq!(manager.get_value("java-format", "timeout").unwrap(), "30");
        assert!(manager.get_value("java-format", "program").is_none());
    }

    #[test]
    fn test_section_selection() {
        let mut manager = manager(
            r#"
[clang-format]
style = "file"

[strict]
style = "google"
"#,
        );

        assert_eq!(manager.get_value("clang-format", "style").unwrap(), "file");
        manager.select_section("strict".to_string());
        assert_eq!(manager.get_value("clang-format", "style").unwrap(), "google");
    }

    #[test]
    fn test_type_conversion() {
        let manager = manager(
            r#"
[base]
console-level = "debug"
bad-level = "loud"
log-file = "/tmp/srctidy.log"

[colours]
enabled = "maybe"
"#,
        );

        assert_eq!(manager.get_log_level("base", "console-level").unwrap(), Some(log::LevelFilter::Debug));
        assert!(manager.get_log_level("base", "bad-level").is_err());
        assert!(manager.get_log_level("base", "missing").unwrap().is_none());
        assert_eq!(manager.get_path("base", "log-file").unwrap(), PathBuf::from("/tmp/srctidy.log"));
        assert!(manager.get_bool("colours", "enabled").is_err());
    }

    #[test]
    fn test_lists_accept_arrays_and_strings() {
        let manager = manager(
            r#"
[walk]
ignored-dirs = [".git", "target"]
ignored-extensions = ".png, .lock"
"#,
        );

        assert_eq!(manager.get_ignored_dirs(), vec![".git", "target"]);
        assert_eq!(manager.get_ignored_extensions().unwrap(), vec![".png", ".lock"]);
    }

    #[test]
    fn test_list_defaults() {
        let manager = ConfigManager::from_config(Configuration::new());
        assert_eq!(manager.get_ignored_dirs().len(), DEFAULT_IGNORED_DIRS.len());
        assert!(manager.get_ignored_extensions().is_none());
        assert_eq!(manager.get_vcs_backend().unwrap(), VcsBackend::default());
        assert!(manager.get_colour_config().unwrap().is_none());
    }

    #[test]
    fn test_timeouts() {
        let manager = manager(
            r#"
[clang-format]
timeout = 2.5

[java-format]
timeout = "-1"
"#,
        );

        assert_eq!(manager.get_timeout("clang-format", "timeout").unwrap(), Some(Duration::from_millis(2500)));
        assert!(manager.get_timeout("java-format", "timeout").is_err());
        assert!(manager.get_timeout("notebook", "timeout").unwrap().is_none());

        assert_eq!(parse_timeout("60").unwrap(), Duration::from_secs(60));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_colour_and_vcs_settings() {
        let manager = manager(
            r#"
[colours]
enabled = false
theme = "light"

[vcs]
backend = "libgit2"
"#,
        );

        let colours = manager.get_colour_config().unwrap().unwrap();
        assert!(!colours.enabled);
        assert_eq!(colours.theme, ColourTheme::Light);
        assert_eq!(manager.get_vcs_backend().unwrap(), VcsBackend::LibGit2);

        let manager = self::manager("[vcs]\nbackend = \"svn\"\n");
        assert!(manager.get_vcs_backend().is_err());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[notebook]\nindent = \"  \"\n").unwrap();

        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        assert_eq!(manager.get_value("notebook", "indent").unwrap(), "  ");
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[walk\nignored-dirs = 1").unwrap();
        assert!(ConfigManager::load_from_file(temp_file.path().to_path_buf()).is_err());
    }
}
