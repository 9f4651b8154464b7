//! Host page seams
//!
//! The core never touches a DOM directly. A host (browser bindings, the
//! in-memory page used by tests and the preview binary) implements these
//! capability traits, and [`Page`] hands out only the capabilities the
//! current page actually has. Components whose elements are missing are
//! simply not constructed.

pub mod memory;
pub mod memory_viewer;

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::Serialize;

use crate::listing::RoomCard;
use crate::models::UserProfile;
use crate::inquiry::InquiryDraft;
use crate::panel::{CtaState, PanelSummary, Thumbnail};

/// Task spawned on the page's single-threaded executor
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Callback with no payload
pub type Callback = Rc<dyn Fn()>;

/// Registration handle for an event listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListenerHandle(pub u64);

/// Registration handle for a resize observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObserverHandle(pub u64);

/// Keyboard key, as far as the core cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }

    /// Keys that activate a focused card
    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// Element geometry in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Delegated click on the room list. `card` is the card element the click
/// originated in, if any.
#[derive(Debug, Clone)]
pub struct ListClick {
    pub card: Option<RoomCard>,
}

/// Delegated keydown on the room list
#[derive(Debug, Clone)]
pub struct ListKey {
    pub key: Key,
    pub card: Option<RoomCard>,
}

pub type ListClickListener = Rc<dyn Fn(&ListClick)>;
pub type ListKeyListener = Rc<dyn Fn(&ListKey)>;
pub type ThumbnailListener = Rc<dyn Fn(usize)>;
pub type KeyListener = Rc<dyn Fn(&Key)>;

/// Window-level services every page has
pub trait WindowHost {
    fn viewport_height(&self) -> f64;

    /// Bounding box of the whole document
    fn document_rect(&self) -> Rect;

    fn add_resize_listener(&self, listener: Callback) -> ListenerHandle;

    fn add_key_listener(&self, listener: KeyListener) -> ListenerHandle;

    fn remove_listener(&self, handle: ListenerHandle);

    /// Run `callback` before the next repaint
    fn request_frame(&self, callback: Box<dyn FnOnce()>);

    /// Spawn a task on the page's event loop
    fn spawn_local(&self, task: LocalTask);
}

/// The room list container
pub trait RoomListView {
    /// Replace the list contents
    fn replace_cards(&self, cards: &[RoomCard]);

    fn set_card_active(&self, id: &str, active: bool);

    /// Whether a card with this id is currently in the list
    fn has_card(&self, id: &str) -> bool;

    fn focus_card(&self, id: &str);

    fn card_rect(&self, id: &str) -> Option<Rect>;

    fn add_click_listener(&self, listener: ListClickListener) -> ListenerHandle;

    fn add_keydown_listener(&self, listener: ListKeyListener) -> ListenerHandle;

    fn remove_listener(&self, handle: ListenerHandle);
}

/// The details panel
pub trait PanelView {
    fn set_title(&self, title: &str);

    fn set_summary(&self, summary: &PanelSummary);

    fn set_cta(&self, cta: &CtaState);

    /// Replace the CTA click action
    fn set_cta_action(&self, action: Option<Callback>);

    fn set_thumbnails(&self, thumbnails: &[Thumbnail]);

    fn set_active_thumbnail(&self, index: usize);

    fn add_thumbnail_listener(&self, listener: ThumbnailListener) -> ListenerHandle;

    fn add_close_listener(&self, listener: Callback) -> ListenerHandle;

    fn remove_listener(&self, handle: ListenerHandle);

    fn set_hero_source(&self, src: &str);

    fn set_hero_visible(&self, visible: bool);

    fn set_pano_visible(&self, visible: bool);

    fn set_open(&self, open: bool);

    /// Grow-animation origin as document percentages
    fn set_grow_origin(&self, origin: Option<(f64, f64)>);

    fn focus_close(&self);
}

/// Elements watched by resize observers during split layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObservedElement {
    Panel,
    FilterBar,
}

/// The split wrapper around the list pane and the panel
pub trait SplitHost {
    /// Height of the fixed header, if the page has one
    fn header_height(&self) -> Option<f64>;

    fn filter_bar_height(&self) -> Option<f64>;

    fn panel_height(&self) -> f64;

    fn set_split(&self, split: bool);

    fn set_details_open(&self, open: bool);

    fn set_tab_strip_visible(&self, visible: bool);

    /// Set or clear a CSS custom property (pixels) on the split wrapper
    fn set_layout_var(&self, name: &str, px: Option<i64>);

    /// Explicit list pane height with vertical scroll, or default flow sizing
    fn set_list_height(&self, height: Option<f64>);

    fn observe_resize(&self, element: ObservedElement, callback: Callback) -> ObserverHandle;

    fn disconnect(&self, handle: ObserverHandle);
}

/// Top-level page sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Home,
    Rooms,
    Faqs,
}

impl Section {
    /// Navigation order
    pub const ORDER: [Section; 3] = [Section::Home, Section::Rooms, Section::Faqs];

    pub fn index(&self) -> usize {
        match self {
            Section::Home => 0,
            Section::Rooms => 1,
            Section::Faqs => 2,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "home" => Some(Section::Home),
            "rooms" => Some(Section::Rooms),
            "faqs" => Some(Section::Faqs),
            _ => None,
        }
    }
}

/// Section containers and the nav tabs
pub trait SectionView {
    /// Show exactly this section
    fn show_section(&self, section: Section);

    fn mark_tab(&self, section: Section);
}

/// Signed-in state, owned by the auth backend
pub trait SessionSource {
    fn current_user(&self) -> Option<UserProfile>;
}

/// Inquiry and sign-in dialogs, owned outside the core
pub trait InquiryFlow {
    fn open_inquiry(&self, draft: InquiryDraft);

    fn prompt_sign_in(&self);
}

/// Capabilities of the current page
pub trait Page {
    fn window(&self) -> Rc<dyn WindowHost>;

    fn room_list(&self) -> Option<Rc<dyn RoomListView>>;

    fn panel(&self) -> Option<Rc<dyn PanelView>>;

    fn split(&self) -> Option<Rc<dyn SplitHost>>;

    fn sections(&self) -> Option<Rc<dyn SectionView>>;
}
