//! Room model - one rentable unit in the residence

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Dorm,
    Studio,
}

impl RoomType {
    /// Short label used by the details panel pill
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::Dorm => "Dorm",
            RoomType::Studio => "Studio",
        }
    }

    /// Label used on list cards
    pub fn card_label(&self) -> &'static str {
        match self {
            RoomType::Dorm => "Dorm Type",
            RoomType::Studio => "Studio Type",
        }
    }
}

/// A room as supplied by the data source.
///
/// Rooms are read-only from the core's point of view. `images` holds the raw
/// media descriptors exactly as the source wrote them; they are only turned
/// into [`MediaItem`](super::MediaItem)s by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub name: String,
    /// Monthly price in whole currency units
    pub price: u32,
    #[serde(default)]
    pub occupancy: u32,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default)]
    pub description: String,
    /// House rules / advance payment note
    #[serde(default)]
    pub advance: String,
    #[serde(default)]
    pub images: Vec<Value>,
}

fn default_capacity() -> u32 {
    1
}

impl Room {
    pub fn new(id: impl Into<String>, room_type: RoomType, name: impl Into<String>, price: u32) -> Self {
        Self {
            id: id.into(),
            room_type,
            name: name.into(),
            price,
            occupancy: 0,
            capacity: 1,
            description: String::new(),
            advance: String::new(),
            images: Vec::new(),
        }
    }

    pub fn with_occupancy(mut self, occupancy: u32, capacity: u32) -> Self {
        self.occupancy = occupancy;
        self.capacity = capacity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_advance(mut self, advance: impl Into<String>) -> Self {
        self.advance = advance.into();
        self
    }

    pub fn with_images(mut self, images: Vec<Value>) -> Self {
        self.images = images;
        self
    }

    /// A room is available while it has at least one free bed
    pub fn is_available(&self) -> bool {
        self.occupancy < self.capacity
    }

    /// Capacity as used by derived views (never below 1)
    pub fn effective_capacity(&self) -> u32 {
        self.capacity.max(1)
    }

    /// Free beds, saturating at zero for over-occupied rooms
    pub fn remaining(&self) -> u32 {
        self.effective_capacity().saturating_sub(self.occupancy)
    }
}
