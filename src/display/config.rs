//! Colour preferences for report output
//!
//! The `[base] color` configuration key and the `--no-color` flag both end up
//! here. Palettes use `colored::Color` directly; there is no user-defined
//! palette.

use colored::Color;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::str::FromStr;

/// When report output is coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourMode {
    /// Colour only when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColourMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ColourMode::Auto),
            "always" | "true" | "yes" | "on" => Ok(ColourMode::Always),
            "never" | "false" | "no" | "off" => Ok(ColourMode::Never),
            _ => Err(format!("Invalid color setting: {}. Valid options: auto, always, never", s)),
        }
    }
}

/// Background the palette is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourTheme {
    Light,
    #[default]
    Dark,
}

impl ColourTheme {
    pub fn palette(&self) -> ColourPalette {
        match self {
            ColourTheme::Light => ColourPalette::light(),
            ColourTheme::Dark => ColourPalette::dark(),
        }
    }
}

/// Colours for each semantic role in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourPalette {
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub muted: Color,
    pub success: Color,
    pub highlight: Color,
}

impl ColourPalette {
    pub fn light() -> Self {
        Self {
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
            muted: Color::Black,
            success: Color::Green,
            highlight: Color::Magenta,
        }
    }

    pub fn dark() -> Self {
        Self {
            error: Color::BrightRed,
            warning: Color::BrightYellow,
            info: Color::BrightBlue,
            muted: Color::BrightBlack,
            success: Color::BrightGreen,
            highlight: Color::BrightCyan,
        }
    }
}

impl Default for ColourPalette {
    fn default() -> Self {
        ColourTheme::default().palette()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourConfig {
    pub mode: ColourMode,
    pub theme: ColourTheme,
    /// Honour the NO_COLOR convention in `Auto` mode
    pub respect_no_color: bool,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            mode: ColourMode::Auto,
            theme: ColourTheme::Dark,
            respect_no_color: true,
        }
    }
}

impl ColourConfig {
    pub fn with_mode(mode: ColourMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self::with_mode(ColourMode::Never)
    }

    pub fn set_mode(&mut self, mode: ColourMode) {
        self.mode = mode;
    }

    /// Resolve the mode against the environment
    pub fn should_use_colours(&self) -> bool {
        match self.mode {
            ColourMode::Never => false,
            ColourMode::Always => true,
            ColourMode::Auto => {
                if self.respect_no_color && std::env::var_os("NO_COLOR").is_some() {
                    return false;
                }
                std::io::stdout().is_terminal()
            }
        }
    }

    pub fn palette(&self) -> ColourPalette {
        self.theme.palette()
    }
}
