//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::panel::Thumbnail;

/// At most one panorama/tour viewer may be alive
pub fn assert_viewer_invariants(live: usize) {
    debug_assert!(live <= 1, "{} viewers alive, expected 0 or 1", live);
}

/// Exactly one thumbnail is highlighted, and it is the displayed one
pub fn assert_thumbnail_invariants(thumbnails: &[Thumbnail], displayed: usize) {
    let active = thumbnails.iter().filter(|t| t.active).count();
    debug_assert!(
        active == 1,
        "{} active thumbnails out of {}, expected exactly 1",
        active,
        thumbnails.len()
    );

    debug_assert!(
        thumbnails.get(displayed).is_some_and(|t| t.active),
        "Displayed media {} is not the active thumbnail",
        displayed
    );
}

/// An open panel always has something to show
pub fn assert_media_invariants(room_id: &str, media_len: usize) {
    debug_assert!(
        media_len > 0,
        "Room {} opened with no media, expected at least the placeholder",
        room_id
    );
}

/// Split layout heights are never negative
pub fn assert_list_height_valid(height: f64) {
    debug_assert!(
        height >= 0.0,
        "List pane height {} is negative",
        height
    );
}
