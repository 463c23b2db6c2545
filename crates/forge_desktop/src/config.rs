//! Desktop surface configuration loaded from the embedded `desktop.toml` manifest.

use leptos::logging;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::RECYCLE_BIN_ICON_ID;

const EMBEDDED_MANIFEST: &str = include_str!("../desktop.toml");
const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Pixel geometry of one grid cell.
pub struct GridMetrics {
    /// Cell width in px.
    pub cell_width: i32,
    /// Cell height in px.
    pub cell_height: i32,
    /// Inset between the surface edge and the first cell, in px.
    pub padding: i32,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            cell_width: 88,
            cell_height: 96,
            padding: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Viewport size assumed before the host reports a real one.
pub struct ViewportSize {
    /// Width in px.
    pub width: i32,
    /// Height in px.
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Manifest entry for a fixed system icon.
pub struct SystemIconSpec {
    /// Fixed icon id, for example `sys:recycle-bin`.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Glyph key.
    pub icon: String,
    /// Palette key.
    pub color: String,
    /// Default column.
    pub col: u32,
    /// Default row.
    pub row: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Resolved desktop configuration.
pub struct DesktopConfig {
    /// Manifest schema version.
    pub schema_version: u32,
    /// Quiet period before a viewport resize is applied.
    pub resize_debounce_ms: u64,
    /// Marquees smaller than this in both dimensions count as clicks.
    pub marquee_click_threshold_px: i32,
    /// Maximum icon label length in characters.
    pub max_label_chars: usize,
    /// Cell geometry.
    pub grid: GridMetrics,
    /// Viewport used until the first resize.
    pub initial_viewport: ViewportSize,
    /// Fixed system icons in display order.
    pub system_icons: Vec<SystemIconSpec>,
}

#[derive(Debug, Error)]
/// Reasons a desktop manifest is rejected.
pub enum ConfigError {
    /// The manifest is not valid TOML for [`DesktopConfig`].
    #[error("invalid desktop manifest: {0}")]
    Parse(#[from] toml::de::Error),
    /// The manifest targets another schema.
    #[error("unsupported desktop manifest schema {0}")]
    UnsupportedSchema(u32),
    /// Cell sizes must be positive and padding non-negative.
    #[error("invalid grid metrics {0:?}")]
    InvalidGrid(GridMetrics),
    /// The recycle bin icon is mandatory.
    #[error("desktop manifest has no `sys:recycle-bin` icon")]
    MissingRecycleBin,
    /// Two system icons share an id.
    #[error("duplicate system icon `{0}`")]
    DuplicateSystemIcon(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// User overrides stored in host preferences; absent fields keep manifest values.
pub struct DesktopConfigOverrides {
    /// Replacement resize debounce.
    pub resize_debounce_ms: Option<u64>,
    /// Replacement marquee click threshold.
    pub marquee_click_threshold_px: Option<i32>,
    /// Replacement cell geometry.
    pub grid: Option<GridMetrics>,
}

impl DesktopConfig {
    /// Parses and validates a manifest.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the TOML is malformed or violates manifest rules.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the manifest compiled into the crate.
    pub fn embedded() -> Self {
        match Self::from_toml_str(EMBEDDED_MANIFEST) {
            Ok(config) => config,
            Err(err) => {
                logging::warn!("embedded desktop manifest rejected, using built-ins: {err}");
                Self::builtin()
            }
        }
    }

    fn builtin() -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            resize_debounce_ms: 250,
            marquee_click_threshold_px: 5,
            max_label_chars: 40,
            grid: GridMetrics::default(),
            initial_viewport: ViewportSize {
                width: 1280,
                height: 720,
            },
            system_icons: vec![SystemIconSpec {
                id: RECYCLE_BIN_ICON_ID.to_string(),
                label: "Recycle Bin".to_string(),
                icon: "trash".to_string(),
                color: "zinc".to_string(),
                col: 0,
                row: 0,
            }],
        }
    }

    /// Applies preference overrides, ignoring any that would make the config invalid.
    pub fn apply_overrides(&mut self, overrides: DesktopConfigOverrides) {
        if let Some(ms) = overrides.resize_debounce_ms {
            self.resize_debounce_ms = ms;
        }
        if let Some(px) = overrides.marquee_click_threshold_px {
            self.marquee_click_threshold_px = px.max(0);
        }
        if let Some(grid) = overrides.grid {
            if grid_is_valid(grid) {
                self.grid = grid;
            } else {
                logging::warn!("ignoring invalid grid override {grid:?}");
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != MANIFEST_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchema(self.schema_version));
        }
        if !grid_is_valid(self.grid) {
            return Err(ConfigError::InvalidGrid(self.grid));
        }
        let mut seen = std::collections::BTreeSet::new();
        for icon in &self.system_icons {
            if !seen.insert(icon.id.as_str()) {
                return Err(ConfigError::DuplicateSystemIcon(icon.id.clone()));
            }
        }
        if !seen.contains(RECYCLE_BIN_ICON_ID) {
            return Err(ConfigError::MissingRecycleBin);
        }
        Ok(())
    }
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

fn grid_is_valid(grid: GridMetrics) -> bool {
    grid.cell_width > 0 && grid.cell_height > 0 && grid.padding >= 0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn embedded_manifest_parses_with_recycle_bin() {
        let config = DesktopConfig::from_toml_str(EMBEDDED_MANIFEST).expect("manifest");
        assert_eq!(config.resize_debounce_ms, 250);
        assert_eq!(config.marquee_click_threshold_px, 5);
        assert_eq!(config.max_label_chars, 40);
        assert!(config
            .system_icons
            .iter()
            .any(|icon| icon.id == RECYCLE_BIN_ICON_ID));
    }

    #[test]
    fn manifest_without_recycle_bin_is_rejected() {
        let raw = EMBEDDED_MANIFEST.replace("sys:recycle-bin", "sys:bin");
        let err = DesktopConfig::from_toml_str(&raw).expect_err("must reject");
        assert!(matches!(err, ConfigError::MissingRecycleBin));
    }

    #[test]
    fn manifest_with_zero_cell_width_is_rejected() {
        let raw = EMBEDDED_MANIFEST.replace("cell_width = 88", "cell_width = 0");
        let err = DesktopConfig::from_toml_str(&raw).expect_err("must reject");
        assert!(matches!(err, ConfigError::InvalidGrid(_)));
    }

    #[test]
    fn overrides_replace_only_valid_fields() {
        let mut config = DesktopConfig::embedded();
        config.apply_overrides(DesktopConfigOverrides {
            resize_debounce_ms: Some(100),
            marquee_click_threshold_px: None,
            grid: Some(GridMetrics {
                cell_width: -1,
                cell_height: 10,
                padding: 0,
            }),
        });

        assert_eq!(config.resize_debounce_ms, 100);
        assert_eq!(config.marquee_click_threshold_px, 5);
        assert_eq!(config.grid, GridMetrics::default());
    }
}
