//! Configuration file support for the studio-bridge CLI
//!
//! Loads settings from `_studio-bridge.toml`.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use studio_bridge_core::{MarkPolicy, NodeNaming};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_studio-bridge.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str = "https://raw.githubusercontent.com/nuxt-content/studio-bridge/main/crates/studio-bridge-cli/schema/studio-bridge.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Conversion configuration
    #[serde(skip_serializing_if = "ConvertConfig::is_empty")]
    pub convert: ConvertConfig,
    /// Output file configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
}

/// How inline marks cross the bridge
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Marks {
    /// Discard marks
    Drop,
    /// Carry marks as wrapper elements (`strong`, `em`, `a`, ...)
    Wrap,
}

/// How editor node types map to content tags
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Naming {
    /// Node type names are used as tags unchanged
    Verbatim,
    /// Tiptap names map to HTML tags (`paragraph` to `p`, `heading` to `h1`..`h6`)
    Html,
}

impl From<Marks> for MarkPolicy {
    fn from(marks: Marks) -> Self {
        match marks {
            Marks::Drop => MarkPolicy::Drop,
            Marks::Wrap => MarkPolicy::Wrap,
        }
    }
}

impl From<Naming> for NodeNaming {
    fn from(naming: Naming) -> Self {
        match naming {
            Naming::Verbatim => NodeNaming::Verbatim,
            Naming::Html => NodeNaming::Html,
        }
    }
}

/// Conversion configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ConvertConfig {
    /// Mark handling: "drop" or "wrap" (default: "drop")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<Marks>,
    /// Node naming: "verbatim" or "html" (default: "verbatim")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming: Option<Naming>,
    /// Move a leading frontmatter node into the content tree's frontmatter (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lift_frontmatter: Option<bool>,
}

impl ConvertConfig {
    fn is_empty(&self) -> bool {
        self.marks.is_none() && self.naming.is_none() && self.lift_frontmatter.is_none()
    }
}

/// Output file configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print output JSON (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
    /// Extension of content tree files (default: "minimark.json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_extension: Option<String>,
    /// Extension of editor document files (default: "tiptap.json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_extension: Option<String>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.pretty.is_none() && self.content_extension.is_none() && self.editor_extension.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_studio-bridge.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with the defaults spelled out, for `init`
    pub fn sample() -> Self {
        Config {
            convert: ConvertConfig {
                marks: Some(Marks::Drop),
                naming: Some(Naming::Verbatim),
                lift_frontmatter: Some(false),
            },
            output: OutputConfig {
                pretty: Some(false),
                content_extension: Some("minimark.json".to_string()),
                editor_extension: Some("tiptap.json".to_string()),
            },
        }
    }
}
