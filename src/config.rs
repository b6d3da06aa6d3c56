//! Configuration management for schema-ast
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-ast.toml)
//! - Environment variables (SCHEMA_AST__*)
//!
//! ## Example config file (schema-ast.toml):
//! ```toml
//! [parser]
//! unreachable_definitions = true
//!
//! [output]
//! format = "compact"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaAstConfig {
    /// Parser settings
    #[serde(default)]
    pub parser: ParseOptions,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Options consumed by the parser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Emit every schema's own `definitions` as interface members, even when
    /// nothing references them
    #[serde(default)]
    pub unreachable_definitions: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl SchemaAstConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "schema-ast.toml",
            ".schema-ast.toml",
            "config/schema-ast.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        let project_dirs = directories::ProjectDirs::from("dev", "schema-ast", "schema-ast");
        if let Some(config_dir) = project_dirs {
            let xdg_config = config_dir.config_dir().join("schema-ast.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Load from environment variables (SCHEMA_AST__PARSER__...)
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_AST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
