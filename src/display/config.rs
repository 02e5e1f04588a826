//! Colour configuration and themes
//!
//! Decides whether console output is coloured and which palette applies.

use colored::Color;
use serde::{Deserialize, Serialize};

/// Colour configuration for the console reporter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColourConfig {
    /// Whether colours are enabled globally
    pub enabled: bool,
    pub theme: ColourTheme,
    /// Whether to respect the NO_COLOR environment variable
    pub respect_no_color: bool,
    /// Force colours even when not in a TTY (--color flag)
    #[serde(skip, default)]
    pub color_forced: bool,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: ColourTheme::Auto,
            respect_no_color: true,
            color_forced: false,
        }
    }
}

/// Available colour themes
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ColourTheme {
    /// Same as dark until background detection exists
    Auto,
    Light,
    Dark,
    Custom(ColourPalette),
}

impl std::str::FromStr for ColourTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColourTheme::Auto),
            "light" => Ok(ColourTheme::Light),
            "dark" => Ok(ColourTheme::Dark),
            _ => Err(format!("Invalid colour theme: {}. Valid options: auto, light, dark", s)),
        }
    }
}

/// Colour names per message role
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColourPalette {
    pub error: String,
    pub warning: String,
    pub info: String,
    pub success: String,
    pub highlight: String,
}

impl Default for ColourPalette {
    fn default() -> Self {
        Self {
            error: "red".to_string(),
            warning: "yellow".to_string(),
            info: "blue".to_string(),
            success: "green".to_string(),
            highlight: "cyan".to_string(),
        }
    }
}

impl ColourPalette {
    /// Palette for light backgrounds
    pub fn light() -> Self {
        Self {
            error: "red".to_string(),
            warning: "yellow".to_string(),
            info: "blue".to_string(),
            success: "green".to_string(),
            highlight: "magenta".to_string(),
        }
    }

    /// Palette for dark backgrounds
    pub fn dark() -> Self {
        Self {
            error: "bright_red".to_string(),
            warning: "bright_yellow".to_string(),
            info: "bright_blue".to_string(),
            success: "bright_green".to_string(),
            highlight: "bright_magenta".to_string(),
        }
    }

    /// Parse a colour name into a Color
    pub fn parse_color(color_str: &str) -> Option<Color> {
        match color_str.to_lowercase().as_str() {
            "black" => Some(Color::Black),
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            "blue" => Some(Color::Blue),
            "magenta" => Some(Color::Magenta),
            "cyan" => Some(Color::Cyan),
            "white" => Some(Color::White),
            "bright_black" => Some(Color::BrightBlack),
            "bright_red" => Some(Color::BrightRed),
            "bright_green" => Some(Color::BrightGreen),
            "bright_yellow" => Some(Color::BrightYellow),
            "bright_blue" => Some(Color::BrightBlue),
            "bright_magenta" => Some(Color::BrightMagenta),
            "bright_cyan" => Some(Color::BrightCyan),
            "bright_white" => Some(Color::BrightWhite),
            _ => None,
        }
    }
}

impl ColourTheme {
    pub fn get_palette(&self) -> ColourPalette {
        match self {
            ColourTheme::Auto | ColourTheme::Dark => ColourPalette::dark(),
            ColourTheme::Light => ColourPalette::light(),
            ColourTheme::Custom(palette) => palette.clone(),
        }
    }
}

impl ColourConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_theme(&mut self, theme: ColourTheme) {
        self.theme = theme;
    }

    /// Force colours on (--color flag)
    pub fn set_color_forced(&mut self, forced: bool) {
        self.color_forced = forced;
    }

    /// Colours apply when enabled and either forced, or on a TTY without NO_COLOR
    pub fn should_use_colours(&self) -> bool {
        if !self.enabled {
            return false;
        }

        if self.color_forced {
            return true;
        }

        if self.respect_no_color && std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        if !self.respect_no_color {
            return true;
        }

        use std::io::IsTerminal;
        std::io::stdout().is_terminal()
    }

    pub fn get_palette(&self) -> ColourPalette {
        self.theme.get_palette()
    }
}
