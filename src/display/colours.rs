//! Core colour management for console output
//!
//! Honours NO_COLOR and degrades to plain text on non-colour terminals.

use colored::{ColoredString, Colorize};
use super::config::{ColourConfig, ColourPalette};

/// Applies the configured palette to console text
#[derive(Debug, Clone)]
pub struct ColourManager {
    config: ColourConfig,
    palette: ColourPalette,
}

impl ColourManager {
    pub fn new() -> Self {
        Self::with_config(ColourConfig::default())
    }

    /// Explicitly enable or disable colours
    pub fn with_colours(enabled: bool) -> Self {
        let mut config = ColourConfig::default();
        config.set_enabled(enabled);
        Self::with_config(config)
    }

    pub fn with_config(config: ColourConfig) -> Self {
        let palette = config.get_palette();
        Self { config, palette }
    }

    /// Precedence: --no-color > --color > config file > default
    pub fn from_color_args(no_color: bool, color: bool, config: Option<ColourConfig>) -> Self {
        let mut final_config = config.unwrap_or_default();

        if no_color {
            final_config.set_enabled(false);
        } else if color {
            final_config.set_enabled(true);
            final_config.set_color_forced(true);
        }

        Self::with_config(final_config)
    }

    pub fn colours_enabled(&self) -> bool {
        self.config.should_use_colours()
    }

    pub fn config(&self) -> &ColourConfig {
        &self.config
    }

    pub fn error(&self, text: &str) -> ColoredString {
        self.paint(text, &self.palette.error)
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        self.paint(text, &self.palette.warning)
    }

    pub fn success(&self, text: &str) -> ColoredString {
        self.paint(text, &self.palette.success)
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        self.paint(text, &self.palette.highlight)
    }

    fn paint(&self, text: &str, color_name: &str) -> ColoredString {
        if !self.colours_enabled() {
            return text.normal();
        }

        match ColourPalette::parse_color(color_name) {
            Some(color) => text.color(color),
            None => text.normal(),
        }
    }
}

impl Default for ColourManager {
    fn default() -> Self {
        Self::new()
    }
}
