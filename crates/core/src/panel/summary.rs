use serde::Serialize;

use crate::listing::format_price;
use crate::models::{MediaItem, Room};

const EMPTY_TEXT: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyBar {
    pub occupied: u32,
    pub capacity: u32,
    /// Fill width, 0 to 100
    pub percent: u8,
    pub numbers: String,
    pub full: bool,
}

impl OccupancyBar {
    pub fn for_room(room: &Room) -> Self {
        let ratio = f64::from(room.occupancy) / f64::from(room.effective_capacity());
        let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
        Self {
            occupied: room.occupancy,
            capacity: room.capacity,
            percent,
            numbers: format!("{} / {}", room.occupancy, room.capacity),
            full: percent >= 100,
        }
    }
}

/// Everything the panel shows about a room besides its media
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSummary {
    pub type_label: &'static str,
    pub price_label: String,
    pub occupancy: OccupancyBar,
    pub description: String,
    pub advance: String,
}

impl PanelSummary {
    pub fn for_room(room: &Room) -> Self {
        Self {
            type_label: room.room_type.label(),
            price_label: format_price(room.price),
            occupancy: OccupancyBar::for_room(room),
            description: or_dash(&room.description),
            advance: or_dash(&room.advance),
        }
    }
}

fn or_dash(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        EMPTY_TEXT.to_string()
    } else {
        text.to_string()
    }
}

/// Inquiry button state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaState {
    pub enabled: bool,
    pub label: &'static str,
    pub title: &'static str,
    pub remaining: u32,
}

impl CtaState {
    pub fn for_room(room: &Room) -> Self {
        let remaining = room.remaining();
        if remaining == 0 {
            Self {
                enabled: false,
                label: "Full",
                title: "This unit is fully occupied",
                remaining,
            }
        } else {
            Self {
                enabled: true,
                label: "Inquire",
                title: "Send an inquiry",
                remaining,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub index: usize,
    pub src: String,
    pub badge: Option<&'static str>,
    pub aria_label: String,
    pub active: bool,
}

impl Thumbnail {
    pub fn new(index: usize, item: &MediaItem, cover: String) -> Self {
        let badge = item.badge();
        let aria_label = match badge {
            Some(badge) => format!("Media {} - {}", index + 1, badge),
            None => format!("Media {}", index + 1),
        };
        Self {
            index,
            src: cover,
            badge,
            aria_label,
            active: index == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomType;

    #[test]
    fn test_occupancy_percent() {
        let half = Room::new("R1", RoomType::Dorm, "Room 1", 4000).with_occupancy(2, 4);
        let bar = OccupancyBar::for_room(&half);
        assert_eq!(bar.percent, 50);
        assert_eq!(bar.numbers, "2 / 4");
        assert!(!bar.full);

        let over = Room::new("R2", RoomType::Dorm, "Room 2", 4000).with_occupancy(5, 4);
        assert_eq!(OccupancyBar::for_room(&over).percent, 100);
        assert!(OccupancyBar::for_room(&over).full);

        let zero_cap = Room::new("R3", RoomType::Dorm, "Room 3", 4000).with_occupancy(0, 0);
        assert_eq!(OccupancyBar::for_room(&zero_cap).percent, 0);

        let third = Room::new("R4", RoomType::Dorm, "Room 4", 4000).with_occupancy(1, 3);
        assert_eq!(OccupancyBar::for_room(&third).percent, 33);
    }

    #[test]
    fn test_summary_dashes_empty_text() {
        let room = Room::new("S1", RoomType::Studio, "Studio 1", 5000).with_description("  ");
        let summary = PanelSummary::for_room(&room);
        assert_eq!(summary.type_label, "Studio");
        assert_eq!(summary.price_label, "₱5,000");
        assert_eq!(summary.description, "—");
        assert_eq!(summary.advance, "—");
    }

    #[test]
    fn test_cta_full_state() {
        let full = Room::new("S1", RoomType::Studio, "Studio 1", 5000).with_occupancy(1, 1);
        let cta = CtaState::for_room(&full);
        assert!(!cta.enabled);
        assert_eq!(cta.label, "Full");
        assert_eq!(cta.title, "This unit is fully occupied");
        assert_eq!(cta.remaining, 0);

        let open = Room::new("R1", RoomType::Dorm, "Room 1", 4000).with_occupancy(2, 4);
        let cta = CtaState::for_room(&open);
        assert!(cta.enabled);
        assert_eq!(cta.label, "Inquire");
        assert_eq!(cta.remaining, 2);
    }

    #[test]
    fn test_thumbnail_labels() {
        let tour = MediaItem::Tour {
            poster: "pngs/TourA.png".into(),
            tour: Default::default(),
        };
        let thumb = Thumbnail::new(1, &tour, "pngs/TourA.png".into());
        assert_eq!(thumb.aria_label, "Media 2 - Tour");
        assert_eq!(thumb.badge, Some("Tour"));
        assert!(!thumb.active);

        let first = Thumbnail::new(0, &MediaItem::image("a.png"), "a.png".into());
        assert_eq!(first.aria_label, "Media 1");
        assert!(first.active);
    }
}
