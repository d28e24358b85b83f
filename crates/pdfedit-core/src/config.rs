//! Editor configuration
//!
//! Every tunable constant of the editing engine lives here. The defaults
//! reproduce the behaviour of the web viewer; the browser can override any
//! subset by passing JSON (missing fields fall back to the defaults).

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Zoom applied when a document is loaded
    pub default_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Increment used by zoom in / zoom out
    pub zoom_step: f64,

    /// Font size used for new text boxes
    pub default_font_size: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,

    /// Size of a new text box, in display pixels at the current zoom
    pub default_box_width_px: f64,
    pub default_box_height_px: f64,
    /// Resize floor, in display pixels at the current zoom
    pub min_box_width_px: f64,
    pub min_box_height_px: f64,
    /// Absolute floor for width/height in document units
    pub min_extent: f64,

    /// Text given to freshly added boxes
    pub placeholder_text: String,
    /// Edge length of the square resize handles, in display pixels
    pub handle_size_px: f64,
    /// Maximum number of undo steps kept
    pub history_limit: usize,
    /// Extra margin painted around an erased text run, in document units
    pub cover_padding: f64,
    /// Suggested name for the exported file
    pub output_filename: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_scale: 1.2,
            min_scale: 0.5,
            max_scale: 3.0,
            zoom_step: 0.2,
            default_font_size: 14.0,
            min_font_size: 6.0,
            max_font_size: 200.0,
            default_box_width_px: 120.0,
            default_box_height_px: 24.0,
            min_box_width_px: 20.0,
            min_box_height_px: 12.0,
            min_extent: 1.0,
            placeholder_text: "New Text".to_string(),
            handle_size_px: 10.0,
            history_limit: 200,
            cover_padding: 1.0,
            output_filename: "edited.pdf".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON object and validate the result
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: EditorConfig =
            serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        fn positive(name: &str, value: f64) -> Result<(), EditorError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EditorError::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        }

        positive("min_scale", self.min_scale)?;
        positive("zoom_step", self.zoom_step)?;
        positive("min_font_size", self.min_font_size)?;
        positive("default_box_width_px", self.default_box_width_px)?;
        positive("default_box_height_px", self.default_box_height_px)?;
        positive("min_box_width_px", self.min_box_width_px)?;
        positive("min_box_height_px", self.min_box_height_px)?;
        positive("min_extent", self.min_extent)?;
        positive("handle_size_px", self.handle_size_px)?;

        if self.min_scale > self.max_scale {
            return Err(EditorError::Config(format!(
                "min_scale {} > max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.default_scale) {
            return Err(EditorError::Config(format!(
                "default_scale {} outside {}..={}",
                self.default_scale, self.min_scale, self.max_scale
            )));
        }
        if self.min_font_size > self.max_font_size {
            return Err(EditorError::Config(format!(
                "min_font_size {} > max_font_size {}",
                self.min_font_size, self.max_font_size
            )));
        }
        if !(self.min_font_size..=self.max_font_size).contains(&self.default_font_size) {
            return Err(EditorError::Config(format!(
                "default_font_size {} outside {}..={}",
                self.default_font_size, self.min_font_size, self.max_font_size
            )));
        }
        if self.placeholder_text.is_empty() {
            return Err(EditorError::Config(
                "placeholder_text must not be empty".to_string(),
            ));
        }
        if self.cover_padding < 0.0 {
            return Err(EditorError::Config(
                "cover_padding must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamp a font size into the configured range. NaN and infinities
    /// fall back to the default size.
    pub fn clamp_font_size(&self, size: f64) -> f64 {
        if !size.is_finite() {
            return self.default_font_size;
        }
        size.clamp(self.min_font_size, self.max_font_size)
    }

    /// Clamp a zoom factor into the configured range; non-finite input gives the default zoom
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.default_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"default_font_size": 18}"#).unwrap();
        assert_eq!(config.default_font_size, 18.0);
        assert_eq!(config.min_box_width_px, 20.0);
        assert_eq!(config.output_filename, "edited.pdf");
    }

    #[test]
    fn test_rejects_inverted_scale_range() {
        let result = EditorConfig::from_json(r#"{"min_scale": 4.0}"#);
        assert!(matches!(result, Err(EditorError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(EditorConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_clamp_font_size() {
        let config = EditorConfig::default();
        assert_eq!(config.clamp_font_size(2.0), 6.0);
        assert_eq!(config.clamp_font_size(500.0), 200.0);
        assert_eq!(config.clamp_font_size(14.0), 14.0);
    }

    #[test]
    fn test_non_finite_font_size_uses_default() {
        let config = EditorConfig::default();
        assert_eq!(config.clamp_font_size(f64::NAN), 14.0);
        assert_eq!(config.clamp_font_size(f64::INFINITY), 14.0);
        assert_eq!(config.clamp_font_size(f64::NEG_INFINITY), 14.0);
        assert_eq!(config.clamp_scale(f64::NAN), 1.2);
    }
}
