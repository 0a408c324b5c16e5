//! Colour roles for dashboard reports
//!
//! Every styling call degrades to plain text when colours are off, so report
//! code can style unconditionally.

use colored::{Color, ColoredString, Colorize};

use super::config::{ColourConfig, ColourMode, ColourPalette};
use crate::model::{ContributionFetchState, ListingFetchState};

#[derive(Debug, Clone)]
pub struct ColourManager {
    config: ColourConfig,
    palette: ColourPalette,
    enabled: bool,
}

impl ColourManager {
    pub fn with_config(config: ColourConfig) -> Self {
        let palette = config.palette();
        let enabled = config.should_use_colours();
        Self {
            config,
            palette,
            enabled,
        }
    }

    /// Create a ColourManager with explicit colour control
    pub fn with_colours(enabled: bool) -> Self {
        let mode = if enabled { ColourMode::Always } else { ColourMode::Never };
        Self::with_config(ColourConfig::with_mode(mode))
    }

    /// The `--no-color` flag overrides any configured mode
    pub fn from_args_and_config(no_color_flag: bool, config: Option<ColourConfig>) -> Self {
        let mut config = config.unwrap_or_default();
        if no_color_flag {
            config.set_mode(ColourMode::Never);
        }
        Self::with_config(config)
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &ColourConfig {
        &self.config
    }

    pub fn error(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.error)
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.warning)
    }

    pub fn info(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.info)
    }

    pub fn muted(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.muted)
    }

    pub fn success(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.success)
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.highlight)
    }

    /// Section headings: highlighted and bold
    pub fn heading(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.color(self.palette.highlight).bold()
        } else {
            text.normal()
        }
    }

    /// A contribution fetch state, coloured by how settled it is
    pub fn contribution_state(&self, state: ContributionFetchState) -> ColoredString {
        let text = state.as_str();
        match state {
            ContributionFetchState::Loaded => self.success(text),
            ContributionFetchState::Pending => self.warning(text),
            ContributionFetchState::Failed => self.error(text),
            ContributionFetchState::Querying => self.info(text),
            ContributionFetchState::NotQueried => self.muted(text),
        }
    }

    pub fn listing_state(&self, state: ListingFetchState) -> ColoredString {
        let text = state.as_str();
        match state {
            ListingFetchState::Queried => self.success(text),
            ListingFetchState::Querying => self.info(text),
            ListingFetchState::NotQueried => self.muted(text),
        }
    }

    /// Signed net line change: growth green, shrinkage red
    pub fn net_change(&self, net: i128) -> ColoredString {
        let text = format!("{:+}", net);
        if net > 0 {
            self.success(&text)
        } else if net < 0 {
            self.error(&text)
        } else {
            self.muted(&text)
        }
    }

    fn paint(&self, text: &str, colour: Color) -> ColoredString {
        if self.enabled {
            text.color(colour)
        } else {
            text.normal()
        }
    }
}

impl Default for ColourManager {
    fn default() -> Self {
        Self::with_config(ColourConfig::default())
    }
}
