//! Media items shown in the details panel

use serde::Serialize;
use serde_json::{Map, Value};

/// A normalized media entry.
///
/// Every variant resolves to a displayable still image, see
/// [`MediaResolver::cover_of`](crate::MediaResolver::cover_of).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaItem {
    /// Plain photo
    Image { src: String },
    /// Single equirectangular 360° image
    #[serde(rename = "pano")]
    Panorama { src: String },
    /// Multi-scene walkthrough
    Tour { poster: String, tour: TourConfig },
}

impl MediaItem {
    pub fn image(src: impl Into<String>) -> Self {
        MediaItem::Image { src: src.into() }
    }

    pub fn panorama(src: impl Into<String>) -> Self {
        MediaItem::Panorama { src: src.into() }
    }

    /// Thumbnail badge text
    pub fn badge(&self) -> Option<&'static str> {
        match self {
            MediaItem::Image { .. } => None,
            MediaItem::Panorama { .. } => Some("360°"),
            MediaItem::Tour { .. } => Some("Tour"),
        }
    }
}

/// Scene graph of a tour.
///
/// Opaque to the core apart from the few lookups needed to derive a poster;
/// the whole object is handed to the viewer library unchanged. Scene order is
/// the order of the source document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TourConfig(Map<String, Value>);

impl TourConfig {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, if it is an object
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|m| Self(m.clone()))
    }

    /// Scene configured as `default.firstScene`
    pub fn first_scene(&self) -> Option<&str> {
        self.0
            .get("default")
            .and_then(|d| d.get("firstScene"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Scene ids in enumeration order
    pub fn scene_ids(&self) -> impl Iterator<Item = &str> {
        self.0
            .get("scenes")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|scenes| scenes.keys().map(String::as_str))
    }

    /// Panorama source of a scene, ignoring empty strings
    pub fn scene_panorama(&self, scene_id: &str) -> Option<&str> {
        self.0
            .get("scenes")
            .and_then(|s| s.get(scene_id))
            .and_then(|scene| scene.get("panorama"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
