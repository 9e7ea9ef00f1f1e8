//! Hook configuration management

use anyhow::{Context, Result, anyhow};
use common::LogFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::mutator::VENDOR_PRODUCT_ANNOTATION;

/// Directory virt-launcher scans for hook sockets
pub const HOOK_SOCKETS_SHARED_DIRECTORY: &str = "/var/run/kubevirt-hooks";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookConfig {
    #[serde(default)]
    pub hook: HookSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookSettings {
    /// Name reported to the supervisor
    pub name: String,
    /// Directory shared with the supervisor
    pub socket_dir: PathBuf,
    /// Socket file name inside `socket_dir`
    pub socket_name: String,
    /// Ordering among peer sidecars (lower runs first)
    pub priority: i32,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            name: "usbredir".to_string(),
            socket_dir: PathBuf::from(HOOK_SOCKETS_SHARED_DIRECTORY),
            socket_name: "usbredir.sock".to_string(),
            priority: 0,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// VMI annotation holding `<vendor>:<product>`
    pub annotation: String,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            annotation: VENDOR_PRODUCT_ANNOTATION.to_string(),
        }
    }
}

impl HookConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            // Try standard locations in order
            let candidates = vec![Self::default_path(), PathBuf::from("/etc/usbredir-hook/hook.toml")];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: HookConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usbredir-hook").join("hook.toml")
        } else {
            PathBuf::from(".config/usbredir-hook/hook.toml")
        }
    }

    /// Full socket path, with `~` in the directory expanded
    pub fn socket_path(&self) -> PathBuf {
        let dir = self.hook.socket_dir.to_string_lossy();
        PathBuf::from(shellexpand::tilde(&dir).as_ref()).join(&self.hook.socket_name)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.hook.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.hook.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.hook.name.trim().is_empty() {
            return Err(anyhow!("Hook name must not be empty"));
        }

        let socket_name = &self.hook.socket_name;
        if socket_name.is_empty() || socket_name.contains('/') || socket_name == "." || socket_name == ".." {
            return Err(anyhow!(
                "Invalid socket name '{}', must be a plain file name",
                socket_name
            ));
        }

        if self.selection.annotation.trim().is_empty() {
            return Err(anyhow!("Selection annotation key must not be empty"));
        }

        Ok(())
    }
}
