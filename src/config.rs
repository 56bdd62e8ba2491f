//! Label configuration
//!
//! Default label style and the viewport labels are clipped to, stored as
//! JSON. Every field is optional in the file; missing ones keep their
//! defaults.
//!
//! ```json
//! {
//!     "viewport_width": 1280,
//!     "viewport_height": 720,
//!     "font_size": "normal",
//!     "color": { "r": 255, "g": 255, "b": 255 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::label::NORMAL_COLOR;
use crate::surface::{Color, Rect};
use crate::text::{Alignment, FontSize};

const CONFIG_DIR: &str = "floating_labels";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Screen area labels are clipped to unless they bring their own
    pub viewport_width: u32,
    pub viewport_height: u32,

    pub font_size: FontSize,
    pub color: Color,
    pub background_color: Color,
    /// 0 = drop shadow instead of a box
    pub background_alpha: u8,
    pub border: u32,
    pub alignment: Alignment,
    pub fadeout: bool,
    pub markup: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        LabelConfig {
            viewport_width: 640,
            viewport_height: 360,
            font_size: FontSize::Small,
            color: NORMAL_COLOR,
            background_color: Color::BLACK,
            background_alpha: 0,
            border: 0,
            alignment: Alignment::Center,
            fadeout: true,
            markup: true,
        }
    }
}

impl LabelConfig {
    pub fn viewport(&self) -> Rect {
        Rect::new(0, 0, self.viewport_width, self.viewport_height)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: LabelConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// `<config dir>/floating_labels/config.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the file at [`default_path`](Self::default_path)
    ///
    /// A missing file silently yields the defaults; an unreadable or broken
    /// one is logged and also yields the defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&path) {
            Ok(config) => {
                log::debug!("loaded label config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("ignoring label config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("floating_labels_{}_{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_file(
            "partial.json",
            r#"{ "viewport_width": 1280, "font_size": "large", "alignment": "left" }"#,
        );

        let config = LabelConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.viewport(), Rect::new(0, 0, 1280, 360));
        assert_eq!(config.font_size, FontSize::Large);
        assert_eq!(config.alignment, Alignment::Left);
        assert_eq!(config.color, NORMAL_COLOR);
        assert!(config.fadeout);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = LabelConfig {
            background_alpha: 180,
            border: 4,
            markup: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<LabelConfig>(&json).unwrap(), config);
    }

    #[test]
    fn test_errors() {
        let missing = std::env::temp_dir().join("floating_labels_definitely_missing.json");
        assert!(matches!(LabelConfig::load_from_file(&missing), Err(ConfigError::Io(_))));

        let path = temp_file("broken.json", "{ not json");
        let result = LabelConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = LabelConfig::default_path() {
            assert!(path.ends_with("floating_labels/config.json"));
        }
    }
}
