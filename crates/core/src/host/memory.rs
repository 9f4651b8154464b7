//! In-memory page
//!
//! A complete host with no browser behind it. It records everything the
//! core renders, counts registered listeners and observers, queues animation
//! frames until [`MemoryPage::run_frames`], and lets callers dispatch user
//! input. Used by the unit tests and by the preview binary.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::Serialize;

use super::{
    Callback, Key, KeyListener, ListClick, ListClickListener, ListKey, ListKeyListener,
    ListenerHandle, LocalTask, ObservedElement, ObserverHandle, Page, PanelView, Rect,
    RoomListView, Section, SectionView, SplitHost, ThumbnailListener, WindowHost,
};
use crate::listing::RoomCard;
use crate::panel::{CtaState, PanelSummary, Thumbnail};

const CARD_HEIGHT: f64 = 120.0;
const LIST_TOP: f64 = 240.0;

/// Which optional parts of the page exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub room_list: bool,
    pub panel: bool,
    pub split: bool,
    pub sections: bool,
}

impl Capabilities {
    pub fn full() -> Self {
        Self {
            room_list: true,
            panel: true,
            split: true,
            sections: true,
        }
    }

    /// A profile page: no rooms markup at all
    pub fn profile_only() -> Self {
        Self {
            room_list: false,
            panel: false,
            split: false,
            sections: false,
        }
    }
}

/// Element holding keyboard focus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "element", content = "id", rename_all = "snake_case")]
pub enum Focus {
    Card(String),
    CloseControl,
}

/// Listener categories, for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    ListClick,
    ListKey,
    Thumbnail,
    PanelClose,
    WindowResize,
    WindowKey,
}

enum Listener {
    ListClick(ListClickListener),
    ListKey(ListKeyListener),
    Thumbnail(ThumbnailListener),
    PanelClose(Callback),
    WindowResize(Callback),
    WindowKey(KeyListener),
}

impl Listener {
    fn kind(&self) -> ListenerKind {
        match self {
            Listener::ListClick(_) => ListenerKind::ListClick,
            Listener::ListKey(_) => ListenerKind::ListKey,
            Listener::Thumbnail(_) => ListenerKind::Thumbnail,
            Listener::PanelClose(_) => ListenerKind::PanelClose,
            Listener::WindowResize(_) => ListenerKind::WindowResize,
            Listener::WindowKey(_) => ListenerKind::WindowKey,
        }
    }
}

/// Everything the core has rendered so far
#[derive(Debug, Clone, Serialize)]
pub struct PageState {
    pub viewport_height: f64,
    pub header_height: Option<f64>,
    pub filter_bar_height: Option<f64>,
    pub panel_height: f64,

    pub cards: Vec<RoomCard>,
    pub active_cards: BTreeSet<String>,
    pub focus: Option<Focus>,

    pub title: Option<String>,
    pub summary: Option<PanelSummary>,
    pub cta: Option<CtaState>,
    pub thumbnails: Vec<Thumbnail>,
    pub active_thumbnail: Option<usize>,
    pub hero_src: Option<String>,
    pub hero_visible: bool,
    pub pano_visible: bool,
    pub panel_open: bool,
    pub grow_origin: Option<(f64, f64)>,

    pub split: bool,
    pub details_open: bool,
    pub tab_strip_visible: bool,
    pub layout_vars: BTreeMap<String, i64>,
    pub list_height: Option<f64>,

    pub section: Option<Section>,
    pub active_tab: Option<Section>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            viewport_height: 900.0,
            header_height: Some(64.0),
            filter_bar_height: Some(48.0),
            panel_height: 640.0,
            cards: Vec::new(),
            active_cards: BTreeSet::new(),
            focus: None,
            title: None,
            summary: None,
            cta: None,
            thumbnails: Vec::new(),
            active_thumbnail: None,
            hero_src: None,
            hero_visible: true,
            pano_visible: false,
            panel_open: false,
            grow_origin: None,
            split: false,
            details_open: false,
            tab_strip_visible: true,
            layout_vars: BTreeMap::new(),
            list_height: None,
            section: None,
            active_tab: None,
        }
    }
}

/// Shared page internals; every capability handed out points here
pub struct MemoryDom {
    state: RefCell<PageState>,
    listeners: RefCell<BTreeMap<ListenerHandle, Listener>>,
    observers: RefCell<BTreeMap<ObserverHandle, (ObservedElement, Callback)>>,
    frames: RefCell<Vec<Box<dyn FnOnce()>>>,
    cta_action: RefCell<Option<Callback>>,
    next_handle: Cell<u64>,
}

impl MemoryDom {
    fn new() -> Self {
        Self {
            state: RefCell::new(PageState::default()),
            listeners: RefCell::new(BTreeMap::new()),
            observers: RefCell::new(BTreeMap::new()),
            frames: RefCell::new(Vec::new()),
            cta_action: RefCell::new(None),
            next_handle: Cell::new(1),
        }
    }

    fn next(&self) -> u64 {
        let id = self.next_handle.get();
        self.next_handle.set(id + 1);
        id
    }

    fn add(&self, listener: Listener) -> ListenerHandle {
        let handle = ListenerHandle(self.next());
        self.listeners.borrow_mut().insert(handle, listener);
        handle
    }

    fn remove(&self, handle: ListenerHandle) {
        self.listeners.borrow_mut().remove(&handle);
    }

    fn card(&self, id: &str) -> Option<RoomCard> {
        self.state.borrow().cards.iter().find(|c| c.id == id).cloned()
    }

    fn observers_of(&self, element: ObservedElement) -> Vec<Callback> {
        self.observers
            .borrow()
            .values()
            .filter(|(e, _)| *e == element)
            .map(|(_, cb)| cb.clone())
            .collect()
    }

    fn update(&self, f: impl FnOnce(&mut PageState)) {
        f(&mut self.state.borrow_mut());
    }
}

impl WindowHost for MemoryDom {
    fn viewport_height(&self) -> f64 {
        self.state.borrow().viewport_height
    }

    fn document_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, 1200.0, 2400.0)
    }

    fn add_resize_listener(&self, listener: Callback) -> ListenerHandle {
        self.add(Listener::WindowResize(listener))
    }

    fn add_key_listener(&self, listener: KeyListener) -> ListenerHandle {
        self.add(Listener::WindowKey(listener))
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        self.remove(handle);
    }

    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.frames.borrow_mut().push(callback);
    }

    /// Panics outside a `LocalSet`
    fn spawn_local(&self, task: LocalTask) {
        tokio::task::spawn_local(task);
    }
}

impl RoomListView for MemoryDom {
    fn replace_cards(&self, cards: &[RoomCard]) {
        self.update(|s| {
            s.cards = cards.to_vec();
            s.active_cards.clear();
            if matches!(s.focus, Some(Focus::Card(_))) {
                s.focus = None;
            }
        });
    }

    fn set_card_active(&self, id: &str, active: bool) {
        self.update(|s| {
            if active {
                if s.cards.iter().any(|c| c.id == id) {
                    s.active_cards.insert(id.to_string());
                }
            } else {
                s.active_cards.remove(id);
            }
        });
    }

    fn has_card(&self, id: &str) -> bool {
        self.state.borrow().cards.iter().any(|c| c.id == id)
    }

    fn focus_card(&self, id: &str) {
        if self.has_card(id) {
            self.update(|s| s.focus = Some(Focus::Card(id.to_string())));
        }
    }

    fn card_rect(&self, id: &str) -> Option<Rect> {
        let state = self.state.borrow();
        let idx = state.cards.iter().position(|c| c.id == id)?;
        Some(Rect::new(24.0, LIST_TOP + idx as f64 * CARD_HEIGHT, 360.0, CARD_HEIGHT))
    }

    fn add_click_listener(&self, listener: ListClickListener) -> ListenerHandle {
        self.add(Listener::ListClick(listener))
    }

    fn add_keydown_listener(&self, listener: ListKeyListener) -> ListenerHandle {
        self.add(Listener::ListKey(listener))
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        self.remove(handle);
    }
}

impl PanelView for MemoryDom {
    fn set_title(&self, title: &str) {
        self.update(|s| s.title = Some(title.to_string()));
    }

    fn set_summary(&self, summary: &PanelSummary) {
        self.update(|s| s.summary = Some(summary.clone()));
    }

    fn set_cta(&self, cta: &CtaState) {
        self.update(|s| s.cta = Some(cta.clone()));
    }

    fn set_cta_action(&self, action: Option<Callback>) {
        *self.cta_action.borrow_mut() = action;
    }

    fn set_thumbnails(&self, thumbnails: &[Thumbnail]) {
        self.update(|s| {
            s.thumbnails = thumbnails.to_vec();
            s.active_thumbnail = thumbnails.iter().position(|t| t.active);
        });
    }

    fn set_active_thumbnail(&self, index: usize) {
        self.update(|s| {
            for (i, thumb) in s.thumbnails.iter_mut().enumerate() {
                thumb.active = i == index;
            }
            s.active_thumbnail = Some(index);
        });
    }

    fn add_thumbnail_listener(&self, listener: ThumbnailListener) -> ListenerHandle {
        self.add(Listener::Thumbnail(listener))
    }

    fn add_close_listener(&self, listener: Callback) -> ListenerHandle {
        self.add(Listener::PanelClose(listener))
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        self.remove(handle);
    }

    fn set_hero_source(&self, src: &str) {
        self.update(|s| s.hero_src = Some(src.to_string()));
    }

    fn set_hero_visible(&self, visible: bool) {
        self.update(|s| s.hero_visible = visible);
    }

    fn set_pano_visible(&self, visible: bool) {
        self.update(|s| s.pano_visible = visible);
    }

    fn set_open(&self, open: bool) {
        self.update(|s| s.panel_open = open);
    }

    fn set_grow_origin(&self, origin: Option<(f64, f64)>) {
        self.update(|s| s.grow_origin = origin);
    }

    fn focus_close(&self) {
        self.update(|s| s.focus = Some(Focus::CloseControl));
    }
}

impl SplitHost for MemoryDom {
    fn header_height(&self) -> Option<f64> {
        self.state.borrow().header_height
    }

    fn filter_bar_height(&self) -> Option<f64> {
        self.state.borrow().filter_bar_height
    }

    fn panel_height(&self) -> f64 {
        self.state.borrow().panel_height
    }

    fn set_split(&self, split: bool) {
        self.update(|s| s.split = split);
    }

    fn set_details_open(&self, open: bool) {
        self.update(|s| s.details_open = open);
    }

    fn set_tab_strip_visible(&self, visible: bool) {
        self.update(|s| s.tab_strip_visible = visible);
    }

    fn set_layout_var(&self, name: &str, px: Option<i64>) {
        self.update(|s| match px {
            Some(px) => {
                s.layout_vars.insert(name.to_string(), px);
            }
            None => {
                s.layout_vars.remove(name);
            }
        });
    }

    fn set_list_height(&self, height: Option<f64>) {
        self.update(|s| s.list_height = height);
    }

    fn observe_resize(&self, element: ObservedElement, callback: Callback) -> ObserverHandle {
        let handle = ObserverHandle(self.next());
        self.observers.borrow_mut().insert(handle, (element, callback));
        handle
    }

    fn disconnect(&self, handle: ObserverHandle) {
        self.observers.borrow_mut().remove(&handle);
    }
}

impl SectionView for MemoryDom {
    fn show_section(&self, section: Section) {
        self.update(|s| s.section = Some(section));
    }

    fn mark_tab(&self, section: Section) {
        self.update(|s| s.active_tab = Some(section));
    }
}

/// In-memory page with a configurable set of capabilities
///
/// Tasks handed to [`WindowHost::spawn_local`] go straight to
/// `tokio::task::spawn_local`, so opening a panorama or tour room must
/// happen inside a `tokio::task::LocalSet`.
#[derive(Clone)]
pub struct MemoryPage {
    dom: Rc<MemoryDom>,
    capabilities: Capabilities,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::full())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            dom: Rc::new(MemoryDom::new()),
            capabilities,
        }
    }

    /// Snapshot of the rendered page
    pub fn state(&self) -> PageState {
        self.dom.state.borrow().clone()
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.dom
            .listeners
            .borrow()
            .values()
            .filter(|l| l.kind() == kind)
            .count()
    }

    pub fn observer_count(&self) -> usize {
        self.dom.observers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.dom.frames.borrow().len()
    }

    /// Run the callbacks queued for the next frame; returns how many ran
    pub fn run_frames(&self) -> usize {
        let frames: Vec<Box<dyn FnOnce()>> = self.dom.frames.borrow_mut().drain(..).collect();
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    fn listeners<T>(&self, pick: impl Fn(&Listener) -> Option<T>) -> Vec<T> {
        self.dom.listeners.borrow().values().filter_map(pick).collect()
    }

    /// Click inside the card with this id
    pub fn click_card(&self, id: &str) {
        let event = ListClick {
            card: self.dom.card(id),
        };
        let listeners = self.listeners(|l| match l {
            Listener::ListClick(f) => Some(f.clone()),
            _ => None,
        });
        for listener in listeners {
            listener(&event);
        }
    }

    /// Click on the list container outside any card
    pub fn click_list_background(&self) {
        let event = ListClick { card: None };
        let listeners = self.listeners(|l| match l {
            Listener::ListClick(f) => Some(f.clone()),
            _ => None,
        });
        for listener in listeners {
            listener(&event);
        }
    }

    /// Keydown while a card has focus
    pub fn key_on_card(&self, id: &str, key: Key) {
        let event = ListKey {
            key,
            card: self.dom.card(id),
        };
        let listeners = self.listeners(|l| match l {
            Listener::ListKey(f) => Some(f.clone()),
            _ => None,
        });
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn click_thumbnail(&self, index: usize) {
        if index >= self.dom.state.borrow().thumbnails.len() {
            return;
        }
        let listeners = self.listeners(|l| match l {
            Listener::Thumbnail(f) => Some(f.clone()),
            _ => None,
        });
        for listener in listeners {
            listener(index);
        }
    }

    pub fn click_close(&self) {
        let listeners = self.listeners(|l| match l {
            Listener::PanelClose(f) => Some(f.clone()),
            _ => None,
        });
        for listener in listeners {
            listener();
        }
    }

    /// Click the CTA button; disabled buttons swallow the click
    pub fn click_cta(&self) {
        let enabled = self.dom.state.borrow().cta.as_ref().is_some_and(|c| c.enabled);
        if !enabled {
            return;
        }
        let action = self.dom.cta_action.borrow().clone();
        if let Some(action) = action {
            action();
        }
    }

    /// Keydown on the window
    pub fn press_key(&self, key: Key) {
        let listeners = self.listeners(|l| match l {
            Listener::WindowKey(f) => Some(f.clone()),
            _ => None,
        });
        for listener in listeners {
            listener(&key);
        }
    }

    pub fn resize_viewport(&self, height: f64) {
        self.dom.update(|s| s.viewport_height = height);
        let listeners = self.listeners(|l| match l {
            Listener::WindowResize(f) => Some(f.clone()),
            _ => None,
        });
        for listener in listeners {
            listener();
        }
    }

    /// Change the panel's rendered height and notify its observers
    pub fn resize_panel(&self, height: f64) {
        self.dom.update(|s| s.panel_height = height);
        for callback in self.dom.observers_of(ObservedElement::Panel) {
            callback();
        }
    }

    pub fn resize_filter_bar(&self, height: f64) {
        self.dom.update(|s| s.filter_bar_height = Some(height));
        for callback in self.dom.observers_of(ObservedElement::FilterBar) {
            callback();
        }
    }

    pub fn set_header_height(&self, height: Option<f64>) {
        self.dom.update(|s| s.header_height = height);
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for MemoryPage {
    fn window(&self) -> Rc<dyn WindowHost> {
        self.dom.clone()
    }

    fn room_list(&self) -> Option<Rc<dyn RoomListView>> {
        self.capabilities
            .room_list
            .then(|| self.dom.clone() as Rc<dyn RoomListView>)
    }

    fn panel(&self) -> Option<Rc<dyn PanelView>> {
        self.capabilities
            .panel
            .then(|| self.dom.clone() as Rc<dyn PanelView>)
    }

    fn split(&self) -> Option<Rc<dyn SplitHost>> {
        self.capabilities
            .split
            .then(|| self.dom.clone() as Rc<dyn SplitHost>)
    }

    fn sections(&self) -> Option<Rc<dyn SectionView>> {
        self.capabilities
            .sections
            .then(|| self.dom.clone() as Rc<dyn SectionView>)
    }
}
