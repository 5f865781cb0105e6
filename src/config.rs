//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/stree/stree.toml`
//! 3. Environment variables: `STREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::util::path::expand_env_vars;

/// Unified configuration for stree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Display name for a document with no folders and no usable file stem
    pub default_display_name: String,
    /// Extension of ST structure files (without dot)
    pub st_extension: String,
    /// Extension of Markdown files (without dot)
    pub markdown_extension: String,
    /// Where the list of open files is kept
    pub session_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_display_name: "Unnamed".into(),
            st_extension: "st".into(),
            markdown_extension: "md".into(),
            session_file: default_session_file(),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_display_name: Option<String>,
    pub st_extension: Option<String>,
    pub markdown_extension: Option<String>,
    pub session_file: Option<PathBuf>,
}

fn default_session_file() -> PathBuf {
    ProjectDirs::from("", "", "stree")
        .map(|dirs| dirs.data_dir().join("session.toml"))
        .unwrap_or_else(|| PathBuf::from("~/.stree/session.toml"))
}

/// Get the XDG config directory for stree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "stree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("stree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.session_file.to_string_lossy().as_ref());
        self.session_file = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn apply(&self, overlay: &RawSettings) -> Self {
        Self {
            default_display_name: overlay
                .default_display_name
                .clone()
                .unwrap_or_else(|| self.default_display_name.clone()),
            st_extension: overlay
                .st_extension
                .clone()
                .map(normalize_extension)
                .unwrap_or_else(|| self.st_extension.clone()),
            markdown_extension: overlay
                .markdown_extension
                .clone()
                .map(normalize_extension)
                .unwrap_or_else(|| self.markdown_extension.clone()),
            session_file: overlay
                .session_file
                .clone()
                .unwrap_or_else(|| self.session_file.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// `config_file` replaces the global config location when given.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        let global_path = config_file
            .map(Path::to_path_buf)
            .or_else(global_config_path);
        if let Some(path) = global_path {
            if path.exists() {
                let raw = load_raw_settings(&path)?;
                current = current.apply(&raw);
            } else if config_file.is_some() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply STREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("STREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            default_display_name: config.get_string("default_display_name").ok(),
            st_extension: config.get_string("st_extension").ok(),
            markdown_extension: config.get_string("markdown_extension").ok(),
            session_file: config.get_string("session_file").ok().map(PathBuf::from),
        };
        Ok(settings.apply(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# stree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/stree/stree.toml
#   Env:    STREE_* environment variables

# Display name for documents without a top-level folder
# default_display_name = "Unnamed"

# File extensions recognized when opening files
# st_extension = "st"
# markdown_extension = "md"

# List of open files restored by `stree session`
# session_file = "~/.local/share/stree/session.toml"
"#
        .to_string()
    }
}

fn normalize_extension(ext: String) -> String {
    ext.trim_start_matches('.').to_string()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
