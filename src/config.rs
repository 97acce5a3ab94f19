//! Workspace configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are overridden by the user's `config.toml` in the workspace directory
//! (`.image-ranker/config.toml` unless `--workspace` says otherwise).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [board]
//! default_mode = "ranking"  # View used until `mode` is first set: ranking | tier
//!
//! [tiers]
//! palette = ["#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#8b5cf6", "#ec4899"]
//!
//! [export]
//! filename = "my-ranking"   # Written as <filename>.png
//! pixel_ratio = 2           # Pixel density multiplier (1-4)
//! background = "#ffffff"    # Fixed color, or "theme" for theme.background
//! aspect_ratio = "square"   # Tier cell shape: wide | square | vertical
//! columns = 5               # Ranked images per row
//! cell_size = 160           # Ranked cell edge, in layout units
//! tier_columns = 8          # Images per tier row before wrapping
//! tier_cell_height = 80     # Tier cell height, in layout units
//! padding = 24              # Padding around the exported view
//! gap = 16                  # Gap between cells and rows
//!
//! [theme]
//! background = "#f8fafc"
//! text = "#0f172a"
//! cell = "#e2e8f0"          # Placeholder behind images, empty tier rows
//! badge = "#0f172a"         # Rank badge fill
//! badge_text = "#ffffff"
//! label_text = "#ffffff"    # Tier names on their colored blocks
//!
//! [processing]
//! max_processes = 4         # Max parallel decode workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! A config file only needs the keys it changes:
//!
//! ```toml
//! [export]
//! background = "theme"
//! ```
//!
//! Unknown keys and sections are errors, so a typo never passes silently.

use crate::color::is_hex_color;
use crate::types::ViewMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file inside the workspace.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Widest grid an export may lay out.
const MAX_COLUMNS: u32 = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Workspace configuration loaded from `config.toml`.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankerConfig {
    /// Board behavior.
    pub board: BoardConfig,
    /// Tier colors.
    pub tiers: TiersConfig,
    /// Export layout and output.
    pub export: ExportConfig,
    /// Colors of the exported view.
    pub theme: ThemeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl RankerConfig {
    /// Check ranges and colors after merging.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.to_string()));
        let e = &self.export;
        if !(1..=4).contains(&e.pixel_ratio) {
            return invalid("export.pixel_ratio must be 1-4");
        }
        if !(1..=MAX_COLUMNS).contains(&e.columns) || !(1..=MAX_COLUMNS).contains(&e.tier_columns) {
            return invalid("export.columns and export.tier_columns must be 1-64");
        }
        if !(16..=1024).contains(&e.cell_size) || !(16..=1024).contains(&e.tier_cell_height) {
            return invalid("export.cell_size and export.tier_cell_height must be 16-1024");
        }
        if e.padding > 512 || e.gap > 512 {
            return invalid("export.padding and export.gap must be at most 512");
        }
        if e.filename.trim().is_empty() || e.filename.contains(['/', '\\']) {
            return invalid("export.filename must be a plain, non-empty file name");
        }
        if let Background::Fixed(color) = &e.background
            && !is_hex_color(color)
        {
            return Err(ConfigError::Validation(format!(
                "export.background must be \"theme\" or a hex color, got '{color}'"
            )));
        }
        if self.tiers.palette.is_empty() {
            return invalid("tiers.palette must not be empty");
        }
        if let Some(bad) = self.tiers.palette.iter().find(|c| !is_hex_color(c)) {
            return Err(ConfigError::Validation(format!(
                "tiers.palette contains invalid color '{bad}'"
            )));
        }
        if let Some((name, bad)) = self.theme.colors().into_iter().find(|(_, c)| !is_hex_color(c)) {
            return Err(ConfigError::Validation(format!(
                "theme.{name} is not a hex color: '{bad}'"
            )));
        }
        Ok(())
    }
}

/// Board behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// View used before the mode has ever been set in this workspace.
    pub default_mode: ViewMode,
}

/// Tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TiersConfig {
    /// Colors handed out round-robin to tiers, default tiers included.
    pub palette: Vec<String>,
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            palette: crate::tiers::DEFAULT_PALETTE
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Background of the exported image.
///
/// Serialized as the string `"theme"` or a hex color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Background {
    /// Use `theme.background`, the color the view itself is drawn on.
    Theme,
    /// A fixed hex color.
    Fixed(String),
}

impl TryFrom<String> for Background {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("theme") {
            Ok(Background::Theme)
        } else if is_hex_color(&value) {
            Ok(Background::Fixed(value))
        } else {
            Err(format!("expected \"theme\" or a hex color, got '{value}'"))
        }
    }
}

impl From<Background> for String {
    fn from(value: Background) -> Self {
        match value {
            Background::Theme => "theme".to_string(),
            Background::Fixed(color) => color,
        }
    }
}

/// Shape of tier cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// 16:9
    Wide,
    /// 1:1
    #[default]
    Square,
    /// 3:4
    Vertical,
}

impl AspectRatio {
    /// `(width, height)` ratio.
    pub fn ratio(self) -> (u32, u32) {
        match self {
            AspectRatio::Wide => (16, 9),
            AspectRatio::Square => (1, 1),
            AspectRatio::Vertical => (3, 4),
        }
    }
}

/// Export layout and output settings. Lengths are layout units; the
/// rendered image multiplies them by `pixel_ratio`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output file stem; the file is `<filename>.png`.
    pub filename: String,
    /// Pixel density multiplier.
    pub pixel_ratio: u32,
    pub background: Background,
    /// Tier cell shape.
    pub aspect_ratio: AspectRatio,
    /// Ranked images per row.
    pub columns: u32,
    /// Edge of a (square) ranked cell.
    pub cell_size: u32,
    /// Images per tier row before it wraps.
    pub tier_columns: u32,
    /// Height of a tier cell; its width follows `aspect_ratio`.
    pub tier_cell_height: u32,
    pub padding: u32,
    pub gap: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: "my-ranking".to_string(),
            pixel_ratio: 2,
            background: Background::Fixed("#ffffff".to_string()),
            aspect_ratio: AspectRatio::Square,
            columns: 5,
            cell_size: 160,
            tier_columns: 8,
            tier_cell_height: 80,
            padding: 24,
            gap: 16,
        }
    }
}

/// Colors of the exported view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub background: String,
    pub text: String,
    /// Placeholder behind images and the fill of empty tier rows.
    pub cell: String,
    /// Rank badge fill.
    pub badge: String,
    pub badge_text: String,
    /// Tier names, drawn on the tier's own color.
    pub label_text: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#f8fafc".to_string(),
            text: "#0f172a".to_string(),
            cell: "#e2e8f0".to_string(),
            badge: "#0f172a".to_string(),
            badge_text: "#ffffff".to_string(),
            label_text: "#ffffff".to_string(),
        }
    }
}

impl ThemeConfig {
    fn colors(&self) -> [(&'static str, &str); 6] {
        [
            ("background", &self.background),
            ("text", &self.text),
            ("cell", &self.cell),
            ("badge", &self.badge),
            ("badge_text", &self.badge_text),
            ("label_text", &self.label_text),
        ]
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Upper bound on export decode workers. Unset means one per core;
    /// larger values are capped at the core count.
    pub max_processes: Option<usize>,
}

/// Decode workers to run: every core when unset, otherwise `n` clamped to
/// `1..=cores`.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// The defaults as a TOML table: the bottom layer every workspace
/// `config.toml` is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RankerConfig::default()).expect("default config must serialize")
}

/// Merge `overlay` onto `base`, recursing into tables.
///
/// A key set in `overlay` wins; a key only in `base` survives. Arrays (such
/// as `tiers.palette`) are replaced whole, never concatenated.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a workspace as a raw TOML value.
///
/// Returns `Ok(None)` if the workspace has no `config.toml`.
pub fn load_raw_config(workspace: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = workspace.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Apply `overlay` (if any) to `base`, then parse and validate the result.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RankerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RankerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the workspace config, merged over stock defaults and validated.
pub fn load_config(workspace: &Path) -> Result<RankerConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(workspace)?)
}

/// Stock `config.toml` with every key and a comment for each, printed by
/// `image-ranker gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Ranker Configuration
# ==========================
# Every key is optional; the values below are the defaults.
# Delete whatever you don't want to change.
#
# Place this file at <workspace>/config.toml (default: .image-ranker/config.toml).
# Misspelled or unknown keys are rejected.

# ---------------------------------------------------------------------------
# Board
# ---------------------------------------------------------------------------
[board]
# View used until `image-ranker mode` is first run: "ranking" or "tier".
# Decides where `promote` sends images and what `export` renders.
default_mode = "ranking"

# ---------------------------------------------------------------------------
# Tiers
# ---------------------------------------------------------------------------
[tiers]
# Colors handed out round-robin: default tiers S A B C D take the first five,
# each added tier takes the next one.
palette = ["#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#8b5cf6", "#ec4899"]

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Output file stem; the image is written as <filename>.png.
filename = "my-ranking"

# Pixel density multiplier (1-4). Layout lengths below are multiplied by it.
pixel_ratio = 2

# Background: a hex color, or "theme" to use theme.background.
background = "#ffffff"

# Shape of tier cells: "wide" (16:9), "square" (1:1) or "vertical" (3:4).
aspect_ratio = "square"

# Ranked images per row (1-64) and the edge of each (square) ranked cell.
columns = 5
cell_size = 160

# Images per tier row before wrapping (1-64), and the height of a tier cell.
tier_columns = 8
tier_cell_height = 80

# Padding around the view and gap between cells and rows.
padding = 24
gap = 16

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
background = "#f8fafc"
text = "#0f172a"
cell = "#e2e8f0"          # Placeholder behind images, empty tier rows
badge = "#0f172a"         # Rank badge fill
badge_text = "#ffffff"
label_text = "#ffffff"    # Tier names on their colored blocks

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel decode workers used by export.
# Leave unset to use one worker per CPU core.
# max_processes = 4
"##
}
