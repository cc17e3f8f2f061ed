use crate::dispatch::DEFAULT_REPLY_TEMPLATE;
use crate::model::{ColorTag, Model, ModelRegistry, RegistryError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid model list: {0}")]
    Models(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Start with the two demo conversations in the sidebar.
    pub seed_examples: bool,
    pub window: WindowConfig,
    pub dispatch: DispatchConfig,
    pub models: Vec<ModelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            seed_examples: true,
            window: WindowConfig::default(),
            dispatch: DispatchConfig::default(),
            models: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    /// Below this width the chat area switches from side-by-side panes to tabs.
    pub narrow_breakpoint: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            narrow_breakpoint: 768.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub reply_template: String,
    /// Send the message into the session auto-created when none was open,
    /// instead of dropping it.
    pub resend_after_autocreate: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            reply_template: DEFAULT_REPLY_TEMPLATE.to_string(),
            resend_after_autocreate: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: ColorTag,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "multichat", "multichat")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the default config file, falling back to defaults when there is
    /// no config directory or no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads a file the user named explicitly. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            result => result,
        }
    }

    pub fn registry(&self) -> Result<ModelRegistry, ConfigError> {
        if self.models.is_empty() {
            return Ok(ModelRegistry::default());
        }

        let models = self
            .models
            .iter()
            .map(|entry| Model {
                id: entry.id.clone(),
                name: entry.name.clone(),
                color: entry.color,
                is_active: entry.active,
            })
            .collect();
        Ok(ModelRegistry::new(models)?)
    }
}
