//! Room catalog - the authoritative room set and its filtered views
//!
//! The catalog never mutates rooms. Data quality problems (occupancy above
//! capacity, zero capacity) are accepted as-is and reported once when the
//! catalog is built; derived views clamp them.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::models::{FilterState, Room};

const FIXTURE_ROOMS: &str = include_str!("../fixtures/rooms.json");

/// Room catalog with O(1) lookup by id
#[derive(Debug, Clone, Default)]
pub struct RoomCatalog {
    /// Rooms in source order
    rooms: Vec<Room>,
    /// Index into `rooms` by room id
    by_id: HashMap<String, usize>,
}

impl RoomCatalog {
    /// Build a catalog from rooms in source order
    pub fn from_rooms(rooms: Vec<Room>) -> Self {
        let mut by_id = HashMap::with_capacity(rooms.len());
        for (idx, room) in rooms.iter().enumerate() {
            if room.capacity == 0 || room.occupancy > room.capacity {
                tracing::warn!(
                    room_id = %room.id,
                    occupancy = room.occupancy,
                    capacity = room.capacity,
                    "Room occupancy does not fit its capacity; derived views will clamp"
                );
            }
            if by_id.insert(room.id.clone(), idx).is_some() {
                tracing::warn!(room_id = %room.id, "Duplicate room id; later entry wins lookups");
            }
        }
        Self { rooms, by_id }
    }

    /// Parse a JSON array of rooms
    pub fn from_json(content: &str) -> Result<Self> {
        let rooms: Vec<Room> = serde_json::from_str(content)?;
        Ok(Self::from_rooms(rooms))
    }

    /// Load a JSON room file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(path = %path.display(), rooms = catalog.len(), "Loaded room catalog");
        Ok(catalog)
    }

    /// The residence's built-in demo rooms
    pub fn fixtures() -> Self {
        // Fixture file ships with the crate
        Self::from_json(FIXTURE_ROOMS).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Built-in room fixtures are invalid");
            Self::default()
        })
    }

    /// All rooms in insertion order
    pub fn all(&self) -> &[Room] {
        &self.rooms
    }

    /// Look up a room by id
    pub fn get(&self, id: &str) -> Option<&Room> {
        self.by_id.get(id).map(|&idx| &self.rooms[idx])
    }

    pub fn is_available(&self, room: &Room) -> bool {
        room.is_available()
    }

    /// Rooms matching a filter, in catalog order
    pub fn filter(&self, state: &FilterState) -> Vec<&Room> {
        self.rooms
            .iter()
            .filter(|room| state.selected_type.matches(room.room_type))
            .filter(|room| !state.available_only || room.is_available())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
