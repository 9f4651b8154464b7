//! Site configuration
//!
//! Loaded from a `site.toml`. Every field has a default so an empty file (or
//! no file at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level site configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Still image used whenever a media descriptor cannot be resolved
    pub fallback_media: String,
    /// Base URL of the page; relative media paths resolve against it
    pub base_url: String,
    pub profile_url: String,
    pub index_url: String,
    /// Optional JSON file with the room list (built-in fixtures otherwise)
    pub rooms_path: Option<PathBuf>,
    pub viewer: ViewerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            fallback_media: "pngs/cazzaResidence.png".to_string(),
            base_url: "https://localhost/".to_string(),
            profile_url: "profile.html".to_string(),
            index_url: "index.html".to_string(),
            rooms_path: None,
            viewer: ViewerConfig::default(),
        }
    }
}

/// Panorama viewer library settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub script_url: String,
    pub stylesheet_url: String,
    /// DOM id of the panorama container
    pub container_id: String,
    /// Horizontal field of view, degrees
    pub hfov: f64,
    pub show_zoom_ctrl: bool,
    pub cross_origin: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            script_url: "https://cdn.jsdelivr.net/npm/pannellum@2.5.6/build/pannellum.js"
                .to_string(),
            stylesheet_url: "https://cdn.jsdelivr.net/npm/pannellum@2.5.6/build/pannellum.css"
                .to_string(),
            container_id: "panoViewer".to_string(),
            hfov: 100.0,
            show_zoom_ctrl: true,
            cross_origin: "anonymous".to_string(),
        }
    }
}

impl SiteConfig {
    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;

        // Relative room files live next to the config
        if let (Some(rooms), Some(dir)) = (config.rooms_path.as_ref(), path.parent()) {
            if rooms.is_relative() {
                config.rooms_path = Some(dir.join(rooms));
            }
        }

        tracing::debug!(path = %path.display(), "Loaded site config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SiteConfig::from_toml("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.viewer.container_id, "panoViewer");
        assert_eq!(config.viewer.hfov, 100.0);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
fallback_media = "img/placeholder.jpg"
base_url = "https://cazza.example/rooms/"

[viewer]
hfov = 90.0
"#;
        let config = SiteConfig::from_toml(toml).unwrap();
        assert_eq!(config.fallback_media, "img/placeholder.jpg");
        assert_eq!(config.base_url, "https://cazza.example/rooms/");
        assert_eq!(config.viewer.hfov, 90.0);
        assert!(config.viewer.show_zoom_ctrl);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(SiteConfig::from_toml("fallback_media = 3").is_err());
    }

    #[test]
    fn test_load_resolves_rooms_path_next_to_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site.toml");
        std::fs::write(&path, "rooms_path = \"rooms.json\"\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.rooms_path, Some(temp.path().join("rooms.json")));
    }
}
