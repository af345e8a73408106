//! Configuration for termscreen.
//!
//! The configuration file is located at `~/.termscreen/config.toml`:
//!
//! ```toml
//! # tracing filter used when RUST_LOG is unset
//! log_level = "info"
//!
//! # Keep what the terminal shows instead of clearing it on open
//! preserve = false
//!
//! # Refuse windows larger than this many cells
//! max_cells = 1000000
//!
//! [labels]
//! # none, 3-2-3, 4-4, 4-4-4, 4-4-4-index
//! format = "4-4"
//!
//! [[ripoff]]
//! line = "top"
//! text = "termscreen"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Context, LabelFormat, Platform, RipoffEdge, ScreenError, SoftLabels};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter (overridden by RUST_LOG)
    pub log_level: String,
    /// Preserve the existing screen on open
    pub preserve: bool,
    /// Upper bound on cells per window
    pub max_cells: Option<usize>,
    /// Soft label settings
    pub labels: LabelConfig,
    /// Ripped-off status strips, in registration order
    pub ripoff: Vec<RipoffConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            preserve: false,
            max_cells: None,
            labels: LabelConfig::default(),
            ripoff: Vec::new(),
        }
    }
}

/// Soft label configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub format: String, // "none", "3-2-3", "4-4", "4-4-4", "4-4-4-index"
    /// Label texts, first entry is F1
    pub text: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            format: "none".to_string(),
            text: Vec::new(),
        }
    }
}

/// One ripped-off strip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RipoffConfig {
    pub line: String, // "top" or "bottom"
    /// Caption written into the strip when it is created
    pub text: String,
}

impl Default for RipoffConfig {
    fn default() -> Self {
        Self {
            line: "top".to_string(),
            text: String::new(),
        }
    }
}

impl RipoffConfig {
    pub fn edge(&self) -> Option<RipoffEdge> {
        match self.line.trim().to_lowercase().as_str() {
            "top" => Some(RipoffEdge::Top),
            "bottom" => Some(RipoffEdge::Bottom),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                match Self::from_toml_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring invalid config {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))?;
        Ok(())
    }

    /// Directory holding config and log files
    pub fn data_dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".termscreen"))
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        Self::data_dir().map(|dir| dir.join("config.toml"))
    }

    /// Soft labels described by `[labels]`, if any
    pub fn soft_labels(&self) -> Option<SoftLabels> {
        let format = LabelFormat::parse(&self.labels.format)?;
        let mut labels = SoftLabels::new(format);
        for (i, text) in self.labels.text.iter().enumerate() {
            labels.set(i + 1, text);
        }
        Some(labels)
    }

    /// Build a context on `platform` with these settings applied
    pub fn build_context<P: Platform>(&self, platform: P) -> Result<Context<P>, ScreenError> {
        let mut ctx = Context::new(platform);
        if let Some(labels) = self.soft_labels() {
            ctx = ctx.with_labels(labels);
        }
        ctx.set_preserve(self.preserve);
        ctx.set_cell_limit(self.max_cells);

        for strip in &self.ripoff {
            let Some(edge) = strip.edge() else {
                tracing::warn!("Unknown ripoff line {:?} ignored", strip.line);
                continue;
            };
            let text = strip.text.clone();
            ctx.ripoff_line(edge, move |win, _cols| {
                win.put_str(0, 0, &text);
            })?;
        }
        Ok(ctx)
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
