//! Room list filter state

use serde::{Deserialize, Serialize};

use super::RoomType;

/// Type selector of the filter bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Dorm,
    Studio,
}

impl TypeFilter {
    pub fn matches(&self, room_type: RoomType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Dorm => room_type == RoomType::Dorm,
            TypeFilter::Studio => room_type == RoomType::Studio,
        }
    }
}

/// Current filter bar selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, rename = "type")]
    pub selected_type: TypeFilter,
    #[serde(default)]
    pub available_only: bool,
}

impl FilterState {
    pub fn new(selected_type: TypeFilter, available_only: bool) -> Self {
        Self {
            selected_type,
            available_only,
        }
    }

    /// Text of the availability toggle label
    pub fn availability_label(&self) -> &'static str {
        if self.available_only {
            "Available Only"
        } else {
            "Show All"
        }
    }
}
