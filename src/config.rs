//! Configuration management for source generation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (sourcegen.toml)
//! - Environment variables (SOURCEGEN__*)
//!
//! ## Example config file (sourcegen.toml):
//! ```toml
//! [input]
//! schemas = "./schemas"
//! roots = ["Parent"]
//!
//! [render]
//! indent = "    "
//! integer_size = 8
//!
//! [package]
//! header_in_namespaced_units = false
//! module_extension = "py"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codegen::{PackageLayout, RenderProfile};

/// Main configuration for the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcegenConfig {
    /// Where definitions come from
    #[serde(default)]
    pub input: InputConfig,

    /// Class formatting
    #[serde(default)]
    pub render: RenderProfile,

    /// Package layout
    #[serde(default)]
    pub package: PackageLayout,
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Definition file or directory
    #[serde(default = "default_schemas_path")]
    pub schemas: PathBuf,

    /// Schemas to generate when none are named on the command line.
    /// Empty means every loaded schema.
    #[serde(default)]
    pub roots: Vec<String>,
}

fn default_schemas_path() -> PathBuf {
    PathBuf::from("schemas")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            schemas: default_schemas_path(),
            roots: Vec::new(),
        }
    }
}

impl SourcegenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "sourcegen.toml",
            ".sourcegen.toml",
            "config/sourcegen.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "sourcegen") {
            let xdg_config = config_dir.config_dir().join("sourcegen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SOURCEGEN__RENDER__INDENT etc.
        builder = builder.add_source(
            Environment::with_prefix("SOURCEGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
