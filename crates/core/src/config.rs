//! Engine configuration
//!
//! Page geometry, extractor thresholds and layout spacing travel together in
//! an explicit [`EngineConfig`] value. Nothing in the core reads ambient state,
//! so two documents can be processed with different geometries side by side.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Page size and margins, in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl Default for PageGeometry {
    /// US Letter with 1-inch margins.
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
        }
    }
}

impl PageGeometry {
    /// Printable height: page height minus top and bottom margins.
    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Printable width: page width minus left and right margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Shortest run of underscores, asterisks or trailing whitespace that
    /// counts as a blank.
    pub min_blank_len: usize,
    /// Word characters a caption needs before it is kept as a label.
    pub min_label_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_blank_len: 3,
            min_label_len: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height available to content on every page.
    pub content_height: f32,
    /// Width handed to the measurer.
    pub content_width: f32,
    /// Vertical gap inserted between two elements sharing a page.
    pub element_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::from_geometry(&PageGeometry::default(), 0.0)
    }
}

impl LayoutConfig {
    pub fn from_geometry(geometry: &PageGeometry, element_spacing: f32) -> Self {
        Self {
            content_height: geometry.content_height(),
            content_width: geometry.content_width(),
            element_spacing,
        }
    }

    /// Default width and spacing with a caller-chosen content height.
    pub fn with_content_height(content_height: f32) -> Self {
        Self {
            content_height,
            ..Self::default()
        }
    }

    /// Reject geometry the paginator cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.content_height.is_finite() || self.content_height <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "content height must be a positive number, got {}",
                self.content_height
            )));
        }
        if !self.content_width.is_finite() || self.content_width <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "content width must be a positive number, got {}",
                self.content_width
            )));
        }
        if !self.element_spacing.is_finite() || self.element_spacing < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "element spacing must be zero or positive, got {}",
                self.element_spacing
            )));
        }
        Ok(())
    }
}

/// On-disk layout section: only the spacing, since heights derive from the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpacingConfig {
    pub element_spacing: f32,
}

/// Complete configuration as read from a TOML file.
///
/// ```toml
/// [page]
/// width = 595.0
/// height = 842.0
///
/// [extractor]
/// min_blank_len = 4
///
/// [layout]
/// element_spacing = 6.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub page: PageGeometry,
    pub extractor: ExtractorConfig,
    pub layout: SpacingConfig,
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, EngineError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Layout parameters derived from the page geometry.
    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig::from_geometry(&self.page, self.layout.element_spacing)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.extractor.min_blank_len == 0 {
            return Err(EngineError::Config(
                "extractor.min_blank_len must be at least 1".to_string(),
            ));
        }
        self.layout()
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_geometry_is_letter() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.content_height(), 648.0);
        assert_eq!(geometry.content_width(), 468.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [page]
            height = 842.0

            [layout]
            element_spacing = 6.0
            "#,
        )
        .unwrap();

        assert_eq!(config.page.height, 842.0);
        assert_eq!(config.page.width, 612.0);
        assert_eq!(config.extractor, ExtractorConfig::default());
        assert_eq!(config.layout().content_height, 698.0);
        assert_eq!(config.layout().element_spacing, 6.0);
    }

    #[test]
    fn test_margins_consuming_page_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [page]
            height = 100.0
            margin_top = 50.0
            margin_bottom = 50.0
            "#,
        );
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_zero_blank_len_rejected() {
        let result = EngineConfig::from_toml_str("[extractor]\nmin_blank_len = 0\n");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("formpage.toml");
        fs::write(&path, "[extractor]\nmin_label_len = 2\n").unwrap();

        let config = EngineConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.extractor.min_label_len, 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = EngineConfig::from_toml_file(&temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(EngineError::Io(_))));
    }

    #[test]
    fn test_layout_validate() {
        assert!(LayoutConfig::with_content_height(500.0).validate().is_ok());
        assert!(LayoutConfig::with_content_height(0.0).validate().is_err());
        assert!(LayoutConfig::with_content_height(-1.0).validate().is_err());
        assert!(LayoutConfig::with_content_height(f32::NAN).validate().is_err());
    }
}
