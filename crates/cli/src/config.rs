//! CLI configuration.
//!
//! Read from an optional TOML file; every field has a default so a partial
//! file (or none) works. Command-line flags override the file.
//!
//! ```toml
//! output = "model.bin"
//!
//! [layout]
//! byte_order = "little"
//! framing = "raw"
//! float = "f64"
//! int = "i32"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use model_blob::{ByteOrder, ElementKind, Framing, Layout};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where `encode` writes when no `--output` is given.
    pub output: PathBuf,
    pub layout: LayoutConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("model.bin"),
            layout: LayoutConfig::default(),
        }
    }
}

/// Byte order, framing and element types shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub byte_order: ByteOrder,
    pub framing: Framing,
    pub float: ElementKind,
    pub int: ElementKind,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Little,
            framing: Framing::Raw,
            float: ElementKind::F64,
            int: ElementKind::I32,
        }
    }
}

impl LayoutConfig {
    pub fn layout(&self) -> Layout {
        Layout::new(self.byte_order, self.framing)
    }
}

impl CliConfig {
    /// Loads `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}
