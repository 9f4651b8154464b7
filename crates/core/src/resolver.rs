//! Media descriptor resolution
//!
//! Room fixtures describe media loosely: a bare URL string, an object tagged
//! `pano` or `tour`, or something malformed. The resolver turns each of them
//! into a [`MediaItem`] and never fails; anything it cannot make sense of
//! becomes the placeholder image.

use serde_json::Value;

use crate::models::{MediaItem, TourConfig};

#[derive(Debug, Clone)]
pub struct MediaResolver {
    placeholder: String,
}

impl MediaResolver {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    fn placeholder_item(&self) -> MediaItem {
        MediaItem::image(self.placeholder.clone())
    }

    /// Normalize one raw descriptor
    pub fn normalize(&self, raw: Option<&Value>) -> MediaItem {
        match raw {
            Some(Value::String(src)) => match non_empty(src) {
                Some(src) => MediaItem::image(src),
                None => self.placeholder_item(),
            },
            Some(Value::Object(obj)) => {
                let src = obj.get("src").and_then(Value::as_str).and_then(non_empty);
                match obj.get("kind").and_then(Value::as_str) {
                    Some("pano") => match src {
                        Some(src) => MediaItem::panorama(src),
                        None => self.placeholder_item(),
                    },
                    Some("tour") => {
                        let poster = obj.get("poster").and_then(Value::as_str).and_then(non_empty);
                        match obj.get("tour").and_then(TourConfig::from_value) {
                            Some(tour) => {
                                let poster = poster
                                    .or_else(|| poster_of_tour(&tour).map(str::to_string))
                                    .unwrap_or_else(|| self.placeholder.clone());
                                MediaItem::Tour { poster, tour }
                            }
                            // A tour without a scene graph can only be shown as a still
                            None => MediaItem::image(poster.unwrap_or_else(|| self.placeholder.clone())),
                        }
                    }
                    _ => match src {
                        Some(src) => MediaItem::image(src),
                        None => self.placeholder_item(),
                    },
                }
            }
            _ => self.placeholder_item(),
        }
    }

    /// Normalize a room's media list; an empty list yields the placeholder
    pub fn normalize_all(&self, images: &[Value]) -> Vec<MediaItem> {
        if images.is_empty() {
            return vec![self.placeholder_item()];
        }
        images.iter().map(|raw| self.normalize(Some(raw))).collect()
    }

    /// Representative still image for a media item
    pub fn cover_of(&self, item: &MediaItem) -> String {
        match item {
            MediaItem::Image { src } | MediaItem::Panorama { src } => src.clone(),
            MediaItem::Tour { poster, tour } => non_empty(poster)
                .or_else(|| poster_of_tour(tour).map(str::to_string))
                .unwrap_or_else(|| self.placeholder.clone()),
        }
    }

    /// Cover of the first descriptor of a room, or the placeholder
    pub fn cover_of_first(&self, images: &[Value]) -> String {
        match images.first() {
            Some(first) => self.cover_of(&self.normalize(Some(first))),
            None => self.placeholder.clone(),
        }
    }
}

/// Poster derived from a tour's scene graph: the configured first scene's
/// panorama, else the first enumerated scene's panorama.
pub fn poster_of_tour(tour: &TourConfig) -> Option<&str> {
    if let Some(pano) = tour.first_scene().and_then(|id| tour.scene_panorama(id)) {
        return Some(pano);
    }
    let first_id = tour.scene_ids().next()?;
    tour.scene_panorama(first_id)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
