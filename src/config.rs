use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};

use crate::display::{ColourConfig, ColourMode};
use crate::notifications::manager::{DEFAULT_DELIVERY_TIMEOUT, DEFAULT_MAX_SUBSCRIBERS};
use crate::remote::SyntheticConfig;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "CONTRIBSTATS_CONFIG";

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Delivery settings for the notification manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub timeout: Duration,
    /// `None` means unlimited
    pub max_subscribers: Option<usize>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DELIVERY_TIMEOUT,
            max_subscribers: Some(DEFAULT_MAX_SUBSCRIBERS),
        }
    }
}

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using empty configuration");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    /// The file this configuration was read from, if any
    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
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

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get boolean value with type conversion
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

    /// Get unsigned integer value with type conversion
    pub fn get_usize(&self, section: &str, key: &str) -> Result<Option<usize>> {
        self.get_value(section, key)
            .map(|value| {
                value
                    .parse::<usize>()
                    .with_context(|| format!("Invalid number for {}.{}: {}", section, key, value))
            })
            .transpose()
    }

    /// Get 64-bit unsigned value with type conversion
    pub fn get_u64(&self, section: &str, key: &str) -> Result<Option<u64>> {
        self.get_value(section, key)
            .map(|value| {
                value
                    .parse::<u64>()
                    .with_context(|| format!("Invalid number for {}.{}: {}", section, key, value))
            })
            .transpose()
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Build the synthetic source configuration from the `[synthetic]` section
    pub fn synthetic_config(&self) -> Result<SyntheticConfig> {
        let mut config = SyntheticConfig::default();

        if let Some(user) = self.get_value("synthetic", "user") {
            config.user = user.clone();
        }
        if let Some(groups) = self.get_usize("synthetic", "groups")? {
            config.groups = groups;
        }
        if let Some(repositories) = self.get_usize("synthetic", "repositories")? {
            config.repositories = repositories;
        }
        if let Some(weeks) = self.get_usize("synthetic", "weeks")? {
            config.weeks = weeks;
        }
        if let Some(contributors) = self.get_usize("synthetic", "contributors")? {
            config.contributors = contributors;
        }
        if let Some(page_size) = self.get_usize("synthetic", "page-size")? {
            config.page_size = page_size;
        }
        if let Some(pending_every) = self.get_usize("synthetic", "pending-every")? {
            config.pending_every = pending_every;
        }
        if let Some(fail_every) = self.get_usize("synthetic", "fail-every")? {
            config.fail_every = fail_every;
        }
        if let Some(seed) = self.get_u64("synthetic", "seed")? {
            config.seed = seed;
        }

        if config.page_size == 0 {
            anyhow::bail!("Invalid synthetic.page-size: must be at least 1");
        }

        Ok(config)
    }

    /// Read `[notifications] timeout-ms` and `max-subscribers` (0 = unlimited)
    pub fn notification_settings(&self) -> Result<NotificationSettings> {
        let mut settings = NotificationSettings::default();

        if let Some(timeout_ms) = self.get_u64("notifications", "timeout-ms")? {
            if timeout_ms == 0 {
                anyhow::bail!("Invalid notifications.timeout-ms: must be at least 1");
            }
            settings.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(max) = self.get_usize("notifications", "max-subscribers")? {
            settings.max_subscribers = (max > 0).then_some(max);
        }

        Ok(settings)
    }

    /// Colour preference from `[base] color` (auto, always or never)
    pub fn colour_config(&self) -> Result<ColourConfig> {
        match self.get_value("base", "color") {
            Some(value) => {
                let mode = value
                    .parse::<ColourMode>()
                    .map_err(|e| anyhow::anyhow!("Invalid base.color: {}", e))?;
                Ok(ColourConfig::with_mode(mode))
            }
            None => Ok(ColourConfig::default()),
        }
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $CONTRIBSTATS_CONFIG
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("contribstats").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".contribstats.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.contribstats.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse().context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) => {
                if subtable.values().all(|v| !matches!(v, Value::Table(_))) {
                    let section_map = subtable
                        .iter()
                        .map(|(subkey, subvalue)| (subkey.clone(), toml_value_to_string(subvalue)))
                        .collect();
                    config.insert(section_name, section_map);
                } else {
                    flatten_toml_table(subtable, section_name, config);
                }
            }
            _ => {
                // Top-level scalar, stored under its own name
                let mut section_map = HashMap::new();
                section_map.insert("value".to_string(), toml_value_to_string(value));
                config.insert(section_name, section_map);
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}
